//! Agent configuration

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Settings shared by the chat loop and the news analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier sent with every completion request
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature for chat turns
    pub chat_temperature: f32,

    /// Sampling temperature for news scoring
    pub analysis_temperature: f32,

    /// Run a web search on the headline before scoring a news item
    pub search_enrichment: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 1500,
            chat_temperature: 0.5,
            analysis_temperature: 0.2,
            search_enrichment: true,
        }
    }
}

impl AgentConfig {
    /// Create a new configuration builder
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Override the model from `OPENAI_MODEL` when it is set
    pub fn with_env_model(mut self) -> Self {
        match std::env::var("OPENAI_MODEL") {
            Ok(model) if !model.trim().is_empty() => {
                self.model = model.trim().to_string();
            }
            _ => {}
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AgentError::Configuration(
                "model must not be empty".to_string(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(AgentError::Configuration(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("chat_temperature", self.chat_temperature),
            ("analysis_temperature", self.analysis_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(AgentError::Configuration(format!(
                    "{name} must be between 0 and 2, got {value}"
                )));
            }
        }

        Ok(())
    }
}

/// Builder for AgentConfig
#[derive(Debug, Default)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    pub fn chat_temperature(mut self, temperature: f32) -> Self {
        self.config.chat_temperature = temperature;
        self
    }

    pub fn analysis_temperature(mut self, temperature: f32) -> Self {
        self.config.analysis_temperature = temperature;
        self
    }

    pub fn search_enrichment(mut self, enabled: bool) -> Self {
        self.config.search_enrichment = enabled;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<AgentConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
