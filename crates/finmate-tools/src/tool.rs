//! The closed tool catalog

use finmate_llm::ToolDefinition;
use finmate_llm::tools::schema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Every tool the model may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    SearchWeb,
    GetStockPrice,
    GetFundamentals,
    GetTechnicalIndicators,
}

impl ToolName {
    /// Catalog order as sent to the model
    pub const ALL: [ToolName; 4] = [
        ToolName::SearchWeb,
        ToolName::GetStockPrice,
        ToolName::GetFundamentals,
        ToolName::GetTechnicalIndicators,
    ];

    /// Wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchWeb => "search_web",
            Self::GetStockPrice => "get_stock_price",
            Self::GetFundamentals => "get_fundamentals",
            Self::GetTechnicalIndicators => "get_technical_indicators",
        }
    }

    /// Look up a tool by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }

    /// Description shown to the model for tool selection
    pub fn description(self) -> &'static str {
        match self {
            Self::SearchWeb => {
                "Search the web for recent news, events or general information. \
                 Use it for anything not covered by the portfolio context."
            }
            Self::GetStockPrice => {
                "Get the latest price of a stock with the change against the previous close."
            }
            Self::GetFundamentals => {
                "Get company fundamentals: sector, market cap, P/E, forward P/E, \
                 dividend yield and 52-week range."
            }
            Self::GetTechnicalIndicators => {
                "Get technical indicators for a stock: RSI(14), SMA(50) and an \
                 overbought/oversold signal computed from six months of daily closes."
            }
        }
    }

    /// JSON schema of the arguments
    pub fn parameter_schema(self) -> Value {
        match self {
            Self::SearchWeb => schema::object(
                json!({ "query": schema::string("The search query") }),
                &["query"],
            ),
            Self::GetStockPrice | Self::GetFundamentals | Self::GetTechnicalIndicators => {
                schema::object(
                    json!({ "ticker": schema::string("Stock ticker symbol, e.g. AAPL") }),
                    &["ticker"],
                )
            }
        }
    }

    /// Definition handed to the completion client
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition::new(self.as_str(), self.description(), self.parameter_schema())
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of `search_web`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

/// Arguments of the per-ticker tools
#[derive(Debug, Clone, Deserialize)]
pub struct TickerArgs {
    pub ticker: String,
}

/// Trim and upper-case a ticker; `None` when nothing is left
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() { None } else { Some(ticker) }
}
