//! Alpha Vantage API client (company overview)

use crate::error::{Result, ToolError};
use crate::market::Fundamentals;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// `OVERVIEW` payload; every value arrives as a string
#[derive(Debug, Deserialize)]
struct CompanyOverview {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
    #[serde(rename = "MarketCapitalization")]
    market_cap: Option<String>,
    #[serde(rename = "PERatio")]
    pe_ratio: Option<String>,
    #[serde(rename = "ForwardPE")]
    forward_pe: Option<String>,
    #[serde(rename = "DividendYield")]
    dividend_yield: Option<String>,
    #[serde(rename = "52WeekHigh")]
    week_52_high: Option<String>,
    #[serde(rename = "52WeekLow")]
    week_52_low: Option<String>,
    #[serde(rename = "Currency")]
    currency: Option<String>,
}

/// Parse an Alpha Vantage numeric field ("None" and "-" mean missing)
fn parse_number(value: Option<&String>) -> Option<f64> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "None" && *v != "-")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "None")
}

impl AlphaVantageClient {
    /// Create a new client with API key, requests-per-minute limit and timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter,
        })
    }

    /// Get company overview and fundamental data
    pub async fn get_fundamentals(&self, ticker: &str) -> Result<Fundamentals> {
        self.rate_limiter.until_ready().await;

        let params = [
            ("function", "OVERVIEW"),
            ("symbol", ticker),
            ("apikey", self.api_key.as_str()),
        ];

        let response = self.client.get(BASE_URL).query(&params).send().await?;

        if !response.status().is_success() {
            return Err(ToolError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;
        overview_from_json(ticker, data)
    }
}

fn overview_from_json(ticker: &str, data: serde_json::Value) -> Result<Fundamentals> {
    if let Some(error) = data.get("Error Message") {
        return Err(ToolError::AlphaVantageError(error.to_string()));
    }

    // Throttled responses come back as a lone "Note" or "Information" field
    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(ToolError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Err(ToolError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: "no company overview found".to_string(),
        });
    }

    let overview: CompanyOverview = serde_json::from_value(data)?;

    Ok(Fundamentals {
        ticker: ticker.to_string(),
        market_cap: parse_number(overview.market_cap.as_ref()),
        pe_ratio: parse_number(overview.pe_ratio.as_ref()),
        forward_pe: parse_number(overview.forward_pe.as_ref()),
        dividend_yield: parse_number(overview.dividend_yield.as_ref()),
        fifty_two_week_high: parse_number(overview.week_52_high.as_ref()),
        fifty_two_week_low: parse_number(overview.week_52_low.as_ref()),
        company_name: parse_text(overview.name),
        sector: parse_text(overview.sector),
        currency: parse_text(overview.currency),
    })
}
