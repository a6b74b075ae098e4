//! Yahoo Finance API client

use crate::error::{Result, ToolError};
use crate::market::Quote;
use chrono::{DateTime, Utc};
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

fn yahoo_error(e: impl std::fmt::Display) -> ToolError {
    ToolError::YahooFinanceError(e.to_string())
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    async fn daily_quotes(&self, ticker: &str, range: &str) -> Result<Vec<yahoo::Quote>> {
        let provider = yahoo::YahooConnector::new().map_err(yahoo_error)?;

        let response = provider
            .get_quote_range(ticker, "1d", range)
            .await
            .map_err(yahoo_error)?;

        let quotes = response.quotes().map_err(yahoo_error)?;
        if quotes.is_empty() {
            return Err(ToolError::DataUnavailable {
                ticker: ticker.to_string(),
                reason: format!("no daily quotes for range {range}"),
            });
        }

        Ok(quotes)
    }

    /// Latest quote plus the previous daily close
    pub async fn get_quote(&self, ticker: &str) -> Result<Quote> {
        let quotes = self.daily_quotes(ticker, "5d").await?;
        let (last, earlier) = match quotes.split_last() {
            Some(split) => split,
            None => {
                return Err(ToolError::DataUnavailable {
                    ticker: ticker.to_string(),
                    reason: "empty quote response".to_string(),
                });
            }
        };

        Ok(Quote {
            ticker: ticker.to_string(),
            price: last.close,
            previous_close: earlier.last().map(|q| q.close),
            timestamp: DateTime::from_timestamp(last.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
        })
    }

    /// Daily closing prices over `range` ("5d", "1mo", "6mo", "1y", ...), oldest first
    pub async fn get_daily_closes(&self, ticker: &str, range: &str) -> Result<Vec<f64>> {
        let quotes = self.daily_quotes(ticker, range).await?;
        Ok(quotes
            .iter()
            .map(|q| q.close)
            .filter(|close| close.is_finite())
            .collect())
    }
}
