//! Runtime wiring the completion client, tool registry and config together

use finmate_llm::CompletionClient;
use finmate_tools::{ToolRegistry, ToolsConfig};
use std::sync::Arc;
use tracing::info;

use crate::agent_loop::AgentLoop;
use crate::analysis::AnalysisAdapter;
use crate::config::AgentConfig;
use crate::error::{AgentError, Result};

/// Shared dependencies for chat runs and news analysis
///
/// Cheap to clone; every agent it creates shares the same client and tools.
#[derive(Clone)]
pub struct AgentRuntime {
    client: Arc<dyn CompletionClient>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl AgentRuntime {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            client,
            tools,
            config,
        }
    }

    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::default()
    }

    pub fn client(&self) -> &Arc<dyn CompletionClient> {
        &self.client
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Create a chat loop over the shared client and tools
    pub fn chat_loop(&self) -> AgentLoop {
        AgentLoop::new(self.client.clone(), self.tools.clone(), self.config.clone())
    }

    /// Create a news analyzer; search enrichment uses the shared tools
    pub fn analyzer(&self) -> AnalysisAdapter {
        AnalysisAdapter::new(self.client.clone(), self.config.clone())
            .with_search(self.tools.clone())
    }
}

/// Builder for AgentRuntime
#[derive(Default)]
pub struct AgentRuntimeBuilder {
    client: Option<Arc<dyn CompletionClient>>,
    tools: Option<Arc<ToolRegistry>>,
    tools_config: ToolsConfig,
    config: AgentConfig,
}

impl AgentRuntimeBuilder {
    /// Set the completion client
    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Use an existing tool registry
    pub fn tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Configuration for the live registry built when no registry is set
    pub fn tools_config(mut self, config: ToolsConfig) -> Self {
        self.tools_config = config;
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the client is missing, the config is invalid or
    /// the live tool registry cannot be created.
    pub fn build(self) -> Result<AgentRuntime> {
        let client = self
            .client
            .ok_or_else(|| AgentError::Configuration("completion client not set".to_string()))?;
        self.config.validate()?;

        let tools = match self.tools {
            Some(tools) => tools,
            None => Arc::new(ToolRegistry::live(self.tools_config)?),
        };

        info!(client = client.name(), model = %self.config.model, "Agent runtime ready");
        Ok(AgentRuntime::new(client, tools, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_loop::{ChatRequest, LoopOutcome};
    use crate::news::{AnalysisSource, NewsItem};
    use crate::testing::{ScriptedClient, offline_registry, text_reply};

    #[test]
    fn test_build_requires_client() {
        let err = AgentRuntime::builder().tools(offline_registry()).build().err().unwrap();
        assert!(matches!(err, AgentError::Configuration(_)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = AgentConfig {
            model: String::new(),
            ..AgentConfig::default()
        };
        let result = AgentRuntime::builder()
            .client(Arc::new(ScriptedClient::new(vec![])))
            .tools(offline_registry())
            .config(config)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_invalid_tools_config() {
        let tools_config = ToolsConfig {
            search_max_results: 0,
            ..ToolsConfig::default()
        };
        let err = AgentRuntime::builder()
            .client(Arc::new(ScriptedClient::new(vec![])))
            .tools_config(tools_config)
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::Tool(_)));
    }

    #[tokio::test]
    async fn test_agents_share_client() {
        let client = Arc::new(ScriptedClient::new(vec![
            text_reply("hello"),
            text_reply("not json"),
        ]));
        let runtime = AgentRuntime::builder()
            .client(client.clone())
            .tools(offline_registry())
            .build()
            .unwrap();

        let reply = runtime.chat_loop().run(ChatRequest::new("hi")).await;
        assert_eq!(reply.outcome, LoopOutcome::Completed);

        let analyzed = runtime
            .analyzer()
            .analyze(&NewsItem::new("Fed holds rates", "", "", ""), &[])
            .await;
        assert_eq!(analyzed.source, AnalysisSource::Fallback);
        assert_eq!(client.calls(), 2);
    }
}
