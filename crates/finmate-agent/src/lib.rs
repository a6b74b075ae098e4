//! Agent layer for finmate
//!
//! [`AgentLoop`] answers chat queries with a bounded tool-calling loop,
//! [`AnalysisAdapter`] scores news items in one structured-output request and
//! [`ContextAssembler`] builds the portfolio/news/document context both use.

pub mod agent_loop;
pub mod analysis;
pub mod config;
pub mod context;
pub mod error;
pub mod news;
pub mod prompts;
pub mod runtime;

#[cfg(test)]
mod testing;

pub use agent_loop::{
    AgentLoop, ChatReply, ChatRequest, LoopObserver, LoopOutcome, MAX_TURNS, NoOpObserver,
    STILL_THINKING,
};
pub use analysis::{AnalysisAdapter, OutputFormat, decode_analysis, fallback_analysis};
pub use config::AgentConfig;
pub use context::ContextAssembler;
pub use error::{AgentError, AnalysisDecodeError, Result};
pub use news::{
    AnalysisResult, AnalysisSource, AnalyzedNews, Category, Impact, NewsItem, RiskLevel,
};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder};
