//! Technical indicator and fundamentals formatting helpers

use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::{RelativeStrengthIndex, SimpleMovingAverage};

use crate::error::{Result, ToolError};

/// RSI lookback
pub const RSI_PERIOD: usize = 14;
/// SMA lookback; also the minimum number of closes accepted
pub const SMA_PERIOD: usize = 50;

/// Momentum reading derived from RSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiSignal {
    pub fn from_rsi(rsi: f64) -> Self {
        if rsi > 70.0 {
            Self::Overbought
        } else if rsi < 30.0 {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

/// Summary returned by `get_technical_indicators`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub ticker: String,
    pub current_price: f64,
    pub rsi_14: f64,
    pub sma_50: f64,
    pub signal: RsiSignal,
    pub data_points: usize,
}

/// Round to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute RSI(14) and SMA(50) over daily closes (oldest first)
pub fn technical_snapshot(ticker: &str, closes: &[f64]) -> Result<TechnicalSnapshot> {
    if closes.len() < SMA_PERIOD {
        return Err(ToolError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: format!(
                "need at least {SMA_PERIOD} daily closes, got {}",
                closes.len()
            ),
        });
    }

    let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD)
        .map_err(|e| ToolError::IndicatorError(e.to_string()))?;
    let mut sma = SimpleMovingAverage::new(SMA_PERIOD)
        .map_err(|e| ToolError::IndicatorError(e.to_string()))?;

    let mut rsi_value = 0.0;
    let mut sma_value = 0.0;
    for &close in closes {
        rsi_value = rsi.next(close);
        sma_value = sma.next(close);
    }

    let current_price = closes.last().copied().unwrap_or_default();

    Ok(TechnicalSnapshot {
        ticker: ticker.to_string(),
        current_price: round2(current_price),
        rsi_14: round2(rsi_value),
        sma_50: round2(sma_value),
        signal: RsiSignal::from_rsi(rsi_value),
        data_points: closes.len(),
    })
}

/// Format market cap in human-readable form
pub fn format_market_cap(cap: f64) -> String {
    if cap >= 1_000_000_000_000.0 {
        format!("${:.2}T", cap / 1_000_000_000_000.0)
    } else if cap >= 1_000_000_000.0 {
        format!("${:.2}B", cap / 1_000_000_000.0)
    } else if cap >= 1_000_000.0 {
        format!("${:.2}M", cap / 1_000_000.0)
    } else {
        format!("${cap:.2}")
    }
}

/// Interpret P/E ratio
pub fn interpret_pe(pe: f64) -> &'static str {
    if pe < 0.0 {
        "Negative (company is not profitable)"
    } else if pe < 15.0 {
        "Low (potentially undervalued or slow growth)"
    } else if pe < 25.0 {
        "Moderate (fairly valued)"
    } else if pe < 50.0 {
        "High (potentially overvalued or high growth)"
    } else {
        "Very High (very expensive or very high growth expectations)"
    }
}
