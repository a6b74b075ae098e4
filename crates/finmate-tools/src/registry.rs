//! Tool registry: fixed catalog plus typed dispatch

use finmate_llm::{ToolCall, ToolDefinition};
use finmate_utils::preview;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::DuckDuckGoClient;
use crate::cache::{CacheKey, ToolCaches};
use crate::config::ToolsConfig;
use crate::error::{Result, ToolError};
use crate::indicators::{format_market_cap, interpret_pe, round2, technical_snapshot};
use crate::market::{Fundamentals, LiveMarketData, MarketData, Quote};
use crate::search::{WebSearch, format_hits};
use crate::tool::{SearchArgs, TickerArgs, ToolName, normalize_ticker};

/// Text handed back to the model for one tool call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub content: String,
    /// Whether the text describes a failure
    pub is_error: bool,
}

impl ToolOutput {
    fn ok(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Read-only registry of the tool catalog
///
/// Dispatch never fails: unknown names, undecodable arguments and backend
/// errors all come back as result text for the model to read.
pub struct ToolRegistry {
    market: Arc<dyn MarketData>,
    search: Arc<dyn WebSearch>,
    caches: ToolCaches,
    config: ToolsConfig,
}

impl ToolRegistry {
    /// Create a registry over the given backends
    pub fn new(
        config: ToolsConfig,
        market: Arc<dyn MarketData>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        let caches = ToolCaches::new(config.cache_ttl_realtime, config.cache_ttl_fundamental);
        Self {
            market,
            search,
            caches,
            config,
        }
    }

    /// Create a registry backed by Yahoo Finance, Alpha Vantage and DuckDuckGo
    pub fn live(config: ToolsConfig) -> Result<Self> {
        config.validate()?;
        let market = Arc::new(LiveMarketData::new(&config)?);
        let search = Arc::new(DuckDuckGoClient::new(
            config.search_rate_limit,
            config.request_timeout,
        )?);
        Ok(Self::new(config, market, search))
    }

    /// Tool definitions in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolName::ALL.into_iter().map(ToolName::definition).collect()
    }

    /// Drop every cached quote, indicator and fundamentals payload
    pub async fn clear_cache(&self) {
        self.caches.clear_all().await;
        info!("Tool caches cleared");
    }

    /// Execute one model-requested call
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        let Some(tool) = ToolName::from_name(&call.name) else {
            warn!(tool = %call.name, call_id = %call.id, "Model requested unknown tool");
            return ToolOutput::error(format!("Unknown tool: {}", call.name));
        };

        info!(tool = %tool, call_id = %call.id, "Executing tool");

        match self.execute(tool, call).await {
            Ok(content) => {
                debug!(tool = %tool, result = %preview(&content, 120), "Tool succeeded");
                ToolOutput::ok(content)
            }
            Err(message) => {
                warn!(tool = %tool, error = %message, "Tool failed");
                ToolOutput::error(message)
            }
        }
    }

    async fn execute(
        &self,
        tool: ToolName,
        call: &ToolCall,
    ) -> std::result::Result<String, String> {
        let invalid = |e: serde_json::Error| format!("Invalid arguments for {tool}: {e}");
        let failed = |e: ToolError| format!("Error: {e}");

        match tool {
            ToolName::SearchWeb => {
                let args: SearchArgs = call.decode_arguments().map_err(invalid)?;
                self.search_web(&args.query).await.map_err(failed)
            }
            ToolName::GetStockPrice => {
                let args: TickerArgs = call.decode_arguments().map_err(invalid)?;
                self.get_stock_price(&args.ticker).await.map_err(failed)
            }
            ToolName::GetFundamentals => {
                let args: TickerArgs = call.decode_arguments().map_err(invalid)?;
                self.get_fundamentals(&args.ticker).await.map_err(failed)
            }
            ToolName::GetTechnicalIndicators => {
                let args: TickerArgs = call.decode_arguments().map_err(invalid)?;
                self.get_technical_indicators(&args.ticker)
                    .await
                    .map_err(failed)
            }
        }
    }

    /// `search_web`: formatted hits, or "No results found."
    pub async fn search_web(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ToolError::SearchError("empty query".to_string()));
        }

        let hits = self
            .search
            .search(query, self.config.search_max_results)
            .await?;
        let limited = &hits[..hits.len().min(self.config.search_max_results)];
        Ok(format_hits(limited))
    }

    /// `get_stock_price`: latest price and change against the previous close
    pub async fn get_stock_price(&self, ticker: &str) -> Result<String> {
        let ticker = require_ticker(ticker)?;
        let value = self
            .caches
            .realtime
            .get_or_fetch(CacheKey::new(ticker.clone(), "quote"), || async {
                let quote = self.market.quote(&ticker).await?;
                Ok::<_, ToolError>(quote_json(&quote))
            })
            .await?;
        Ok(value.to_string())
    }

    /// `get_fundamentals`: company overview numbers
    pub async fn get_fundamentals(&self, ticker: &str) -> Result<String> {
        let ticker = require_ticker(ticker)?;
        let value = self
            .caches
            .fundamental
            .get_or_fetch(CacheKey::new(ticker.clone(), "fundamentals"), || async {
                let fundamentals = self.market.fundamentals(&ticker).await?;
                Ok::<_, ToolError>(fundamentals_json(&fundamentals))
            })
            .await?;
        Ok(value.to_string())
    }

    /// `get_technical_indicators`: RSI(14), SMA(50) and signal over six months
    pub async fn get_technical_indicators(&self, ticker: &str) -> Result<String> {
        let ticker = require_ticker(ticker)?;
        let value = self
            .caches
            .realtime
            .get_or_fetch(CacheKey::new(ticker.clone(), "technicals"), || async {
                let closes = self.market.daily_closes(&ticker, "6mo").await?;
                let snapshot = technical_snapshot(&ticker, &closes)?;
                Ok::<_, ToolError>(serde_json::to_value(snapshot)?)
            })
            .await?;
        Ok(value.to_string())
    }
}

fn require_ticker(raw: &str) -> Result<String> {
    normalize_ticker(raw).ok_or_else(|| ToolError::InvalidTicker(raw.to_string()))
}

fn quote_json(quote: &Quote) -> Value {
    let change = quote.previous_close.map(|prev| quote.price - prev);
    let change_percent = quote
        .previous_close
        .filter(|prev| *prev != 0.0)
        .map(|prev| (quote.price - prev) / prev * 100.0);

    json!({
        "ticker": quote.ticker,
        "price": round2(quote.price),
        "previous_close": quote.previous_close.map(round2),
        "change": change.map(round2),
        "change_percent": change_percent.map(round2),
        "timestamp": quote.timestamp.to_rfc3339(),
    })
}

fn fundamentals_json(f: &Fundamentals) -> Value {
    json!({
        "ticker": f.ticker,
        "company_name": f.company_name,
        "sector": f.sector,
        "market_cap": f.market_cap,
        "market_cap_formatted": f.market_cap.map(format_market_cap),
        "pe_ratio": f.pe_ratio,
        "pe_interpretation": f.pe_ratio.map(interpret_pe),
        "forward_pe": f.forward_pe,
        "dividend_yield": f.dividend_yield,
        "fifty_two_week_high": f.fifty_two_week_high,
        "fifty_two_week_low": f.fifty_two_week_low,
        "currency": f.currency,
    })
}
