//! Completion client abstraction layer for finmate
//!
//! This crate provides provider-agnostic abstractions for talking to a
//! tool-calling language model. It includes:
//!
//! - Message and tool-call types for the conversation sequence
//! - Completion request/response types, including structured output modes
//! - Tool definitions for function calling
//! - The `CompletionClient` trait consumed by the agent loop
//! - An OpenAI-compatible client (behind the `openai` feature)

pub mod client;
pub mod completion;
pub mod error;
pub mod messages;
pub mod tools;

// Re-export main types
pub use client::CompletionClient;
pub use completion::{
    CompletionRequest, CompletionResponse, ResponseFormat, StopReason, TokenUsage,
};
pub use error::{LLMError, Result};
pub use messages::{Message, Role, ToolCall};
pub use tools::ToolDefinition;

// Client implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
