//! Shared utilities for finmate
//!
//! This crate provides common functionality used across the finmate workspace:
//! logging setup and the character-safe text helpers used when building
//! prompts and log previews.

pub mod logging;
pub mod text;

pub use logging::{init_tracing, init_tracing_with_default};
pub use text::{preview, truncate_chars};
