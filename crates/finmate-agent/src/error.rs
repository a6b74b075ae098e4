//! Error types for the agent layer

use finmate_llm::LLMError;
use finmate_tools::ToolError;
use thiserror::Error;

/// Errors raised while wiring agents together
///
/// Loop and analysis runs never return these; every failure inside a run
/// resolves to a value.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Why a model reply could not be read as an analysis
#[derive(Error, Debug)]
pub enum AnalysisDecodeError {
    #[error("invalid analysis JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sentiment_score {0} is outside 0-10")]
    SentimentOutOfRange(f64),

    #[error("invalid {field} label '{label}'")]
    InvalidLabel { field: &'static str, label: String },
}
