//! Market data backend abstraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AlphaVantageClient, YahooFinanceClient};
use crate::config::ToolsConfig;
use crate::error::{Result, ToolError};

/// Latest price for a ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub ticker: String,
    pub price: f64,
    /// Previous daily close, when the upstream returned one
    pub previous_close: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Company overview numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub ticker: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub currency: Option<String>,
}

/// Source of quotes, price history and fundamentals
///
/// Tickers arrive already normalized (trimmed, upper-cased).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Latest quote
    async fn quote(&self, ticker: &str) -> Result<Quote>;

    /// Daily closing prices, oldest first, over a Yahoo-style range ("5d", "6mo", ...)
    async fn daily_closes(&self, ticker: &str, range: &str) -> Result<Vec<f64>>;

    /// Company fundamentals
    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals>;
}

/// Live backend: Yahoo Finance for prices, Alpha Vantage for fundamentals
pub struct LiveMarketData {
    yahoo: YahooFinanceClient,
    alpha_vantage: Option<AlphaVantageClient>,
}

impl LiveMarketData {
    /// Build the live backend from configuration
    pub fn new(config: &ToolsConfig) -> Result<Self> {
        let alpha_vantage = config
            .alpha_vantage_api_key
            .as_ref()
            .map(|key| {
                AlphaVantageClient::new(
                    key.clone(),
                    config.alpha_vantage_rate_limit,
                    config.request_timeout,
                )
            })
            .transpose()?;

        Ok(Self {
            yahoo: YahooFinanceClient::new(),
            alpha_vantage,
        })
    }
}

#[async_trait]
impl MarketData for LiveMarketData {
    async fn quote(&self, ticker: &str) -> Result<Quote> {
        self.yahoo.get_quote(ticker).await
    }

    async fn daily_closes(&self, ticker: &str, range: &str) -> Result<Vec<f64>> {
        self.yahoo.get_daily_closes(ticker, range).await
    }

    async fn fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        match &self.alpha_vantage {
            Some(client) => client.get_fundamentals(ticker).await,
            None => Err(ToolError::ConfigError(
                "Fundamentals need an Alpha Vantage API key (ALPHA_VANTAGE_API_KEY)".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fundamentals_without_key() {
        let market = LiveMarketData::new(&ToolsConfig::default()).unwrap();
        let err = market.fundamentals("AAPL").await.unwrap_err();
        assert!(matches!(err, ToolError::ConfigError(_)));
        assert!(err.to_string().contains("ALPHA_VANTAGE_API_KEY"));
    }
}
