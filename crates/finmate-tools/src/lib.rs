//! Tool catalog for finmate
//!
//! The model can call four tools: `search_web`, `get_stock_price`,
//! `get_fundamentals` and `get_technical_indicators`. [`ToolRegistry`] owns
//! the catalog and turns every call into result text.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod market;
pub mod registry;
pub mod search;
pub mod tool;

pub use config::ToolsConfig;
pub use error::{Result, ToolError};
pub use market::{Fundamentals, LiveMarketData, MarketData, Quote};
pub use registry::{ToolOutput, ToolRegistry};
pub use search::{SearchHit, WebSearch};
pub use tool::ToolName;
