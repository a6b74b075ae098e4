//! Subcommand implementations

pub mod analyze;
pub mod chat;
pub mod portfolio;

use anyhow::Context;
use finmate_agent::{AgentConfig, AgentRuntime};
use finmate_llm::providers::OpenAIClient;
use finmate_tools::ToolsConfig;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Build the runtime from environment variables
///
/// `OPENAI_API_KEY` is required; `OPENAI_API_BASE`, `OPENAI_MODEL` and
/// `ALPHA_VANTAGE_API_KEY` are optional.
pub fn build_runtime() -> anyhow::Result<AgentRuntime> {
    let client = OpenAIClient::from_env().context("could not create the OpenAI client")?;
    let config = AgentConfig::default().with_env_model();
    let tools_config = ToolsConfig::default().with_env_api_key();

    let runtime = AgentRuntime::builder()
        .client(Arc::new(client))
        .tools_config(tools_config)
        .config(config)
        .build()?;
    Ok(runtime)
}

/// Read and decode a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("could not parse {}", path.display()))
}
