//! Completion client trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Trait for completion backends
///
/// Implementations send one request and return the assistant message the
/// backend produced, tool calls included. Retries and fallbacks belong to the
/// caller.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a completion
    ///
    /// # Arguments
    ///
    /// * `request` - The completion request with messages, tools, and parameters
    ///
    /// # Returns
    ///
    /// The completion response with the assistant's message and metadata
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the client name (e.g., "openai")
    fn name(&self) -> &str;
}
