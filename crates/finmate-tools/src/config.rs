//! Configuration for tool backends

use crate::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the tool registry and its backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Alpha Vantage API key (fundamentals are unavailable without it)
    pub alpha_vantage_api_key: Option<String>,

    /// Cache TTL for quotes and technical indicators
    pub cache_ttl_realtime: Duration,

    /// Cache TTL for fundamental data
    pub cache_ttl_fundamental: Duration,

    /// Maximum number of web search hits returned to the model
    pub search_max_results: usize,

    /// Request timeout for HTTP backends
    pub request_timeout: Duration,

    /// Alpha Vantage requests per minute
    pub alpha_vantage_rate_limit: u32,

    /// Web search requests per second
    pub search_rate_limit: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            cache_ttl_realtime: Duration::from_secs(60),
            cache_ttl_fundamental: Duration::from_secs(3600),
            search_max_results: 3,
            request_timeout: Duration::from_secs(30),
            alpha_vantage_rate_limit: 5, // free tier
            search_rate_limit: 1,
        }
    }
}

impl ToolsConfig {
    /// Create a new configuration builder
    pub fn builder() -> ToolsConfigBuilder {
        ToolsConfigBuilder::default()
    }

    /// Load the Alpha Vantage API key from `ALPHA_VANTAGE_API_KEY` if set
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var("ALPHA_VANTAGE_API_KEY") {
            if !key.trim().is_empty() {
                self.alpha_vantage_api_key = Some(key);
            }
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.search_max_results == 0 {
            return Err(ToolError::ConfigError(
                "search_max_results must be greater than 0".to_string(),
            ));
        }

        if self.alpha_vantage_rate_limit == 0 || self.search_rate_limit == 0 {
            return Err(ToolError::ConfigError(
                "rate limits must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ToolError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ToolsConfig
#[derive(Debug, Default)]
pub struct ToolsConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    cache_ttl_realtime: Option<Duration>,
    cache_ttl_fundamental: Option<Duration>,
    search_max_results: Option<usize>,
    request_timeout: Option<Duration>,
    alpha_vantage_rate_limit: Option<u32>,
    search_rate_limit: Option<u32>,
}

impl ToolsConfigBuilder {
    /// Set the Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set cache TTL for quotes and technicals
    pub fn cache_ttl_realtime(mut self, duration: Duration) -> Self {
        self.cache_ttl_realtime = Some(duration);
        self
    }

    /// Set cache TTL for fundamental data
    pub fn cache_ttl_fundamental(mut self, duration: Duration) -> Self {
        self.cache_ttl_fundamental = Some(duration);
        self
    }

    /// Set the maximum number of search hits
    pub fn search_max_results(mut self, max: usize) -> Self {
        self.search_max_results = Some(max);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set web search requests per second
    pub fn search_rate_limit(mut self, per_second: u32) -> Self {
        self.search_rate_limit = Some(per_second);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ToolsConfig> {
        let default = ToolsConfig::default();

        let config = ToolsConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            cache_ttl_realtime: self.cache_ttl_realtime.unwrap_or(default.cache_ttl_realtime),
            cache_ttl_fundamental: self
                .cache_ttl_fundamental
                .unwrap_or(default.cache_ttl_fundamental),
            search_max_results: self.search_max_results.unwrap_or(default.search_max_results),
            request_timeout: self.request_timeout.unwrap_or(default.request_timeout),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(default.alpha_vantage_rate_limit),
            search_rate_limit: self.search_rate_limit.unwrap_or(default.search_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolsConfig::default();
        assert_eq!(config.cache_ttl_realtime, Duration::from_secs(60));
        assert_eq!(config.cache_ttl_fundamental, Duration::from_secs(3600));
        assert_eq!(config.search_max_results, 3);
        assert!(config.alpha_vantage_api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ToolsConfig::builder()
            .alpha_vantage_api_key("demo")
            .cache_ttl_realtime(Duration::from_secs(5))
            .search_max_results(5)
            .build()
            .unwrap();

        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
        assert_eq!(config.cache_ttl_realtime, Duration::from_secs(5));
        assert_eq!(config.search_max_results, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_validation() {
        assert!(ToolsConfig::builder().search_max_results(0).build().is_err());
        assert!(ToolsConfig::builder().search_rate_limit(0).build().is_err());
        assert!(
            ToolsConfig::builder()
                .request_timeout(Duration::ZERO)
                .build()
                .is_err()
        );
    }
}
