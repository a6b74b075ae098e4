//! HTTP clients for market data and search providers

pub mod alpha_vantage;
pub mod duckduckgo;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use duckduckgo::DuckDuckGoClient;
pub use yahoo::YahooFinanceClient;
