//! Error types for tool backends

use thiserror::Error;

/// Errors raised by market data, search and indicator code
///
/// These never leave the registry: dispatch turns them into tool-result text.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Ticker symbol could not be used for a lookup
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// Data not available for the requested ticker
    #[error("Data not available for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// Rate limit exceeded for an upstream API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Web search backend error
    #[error("Search error: {0}")]
    SearchError(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    IndicatorError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ToolError::InvalidTicker(String::new());
        assert_eq!(err.to_string(), "Invalid ticker: ");

        let err = ToolError::DataUnavailable {
            ticker: "TSLA".to_string(),
            reason: "only 12 daily closes".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for TSLA: only 12 daily closes"
        );

        let err = ToolError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for Alpha Vantage");
    }
}
