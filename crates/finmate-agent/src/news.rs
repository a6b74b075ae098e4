//! News items and their scored analysis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Raw news item as fetched from a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl NewsItem {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
        link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            source: source.into(),
            link: link.into(),
            published: None,
        }
    }
}

/// News category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Markets,
    Macro,
    Equities,
    Energy,
    Tech,
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Markets,
        Category::Macro,
        Category::Equities,
        Category::Energy,
        Category::Tech,
        Category::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Markets => "Markets",
            Self::Macro => "Macro",
            Self::Equities => "Equities",
            Self::Energy => "Energy",
            Self::Tech => "Tech",
            Self::General => "General",
        }
    }

    /// Case-insensitive lookup; anything unknown is `General`
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Self::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label that did not match any allowed value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown label '{0}'")]
pub struct UnknownLabel(pub String);

/// Expected effect of a story on the portfolio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

impl Impact {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl FromStr for Impact {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk attached to a story
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scored analysis of one news item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub headline: String,
    pub summary: String,
    /// 0 (very bearish) to 10 (very bullish)
    pub sentiment_score: u8,
    pub category: Category,
    pub affected_tickers: Vec<String>,
    pub impact: Impact,
    pub impact_reason: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub related_sources: Vec<String>,
}

/// Where an analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Fallback,
}

/// A news item together with its analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedNews {
    pub item: NewsItem,
    pub analysis: AnalysisResult,
    pub source: AnalysisSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_from_label() {
        assert_eq!(Category::from_label("tech"), Category::Tech);
        assert_eq!(Category::from_label(" MACRO "), Category::Macro);
        assert_eq!(Category::from_label("Crypto"), Category::General);
        assert_eq!(Category::from_label(""), Category::General);
    }

    #[test]
    fn test_impact_and_risk_parse() {
        assert_eq!("Positive".parse::<Impact>().unwrap(), Impact::Positive);
        assert_eq!(" negative".parse::<Impact>().unwrap(), Impact::Negative);
        assert!("bullish".parse::<Impact>().is_err());

        assert_eq!("HIGH".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        let err = "extreme".parse::<RiskLevel>().unwrap_err();
        assert_eq!(err, UnknownLabel("extreme".to_string()));
        assert_eq!(err.to_string(), "unknown label 'extreme'");
    }

    #[test]
    fn test_news_item_minimal_json() {
        let item: NewsItem = serde_json::from_value(json!({ "title": "Fed holds rates" })).unwrap();
        assert_eq!(item.title, "Fed holds rates");
        assert!(item.summary.is_empty());
        assert!(item.published.is_none());
    }

    #[test]
    fn test_analysis_result_wire_labels() {
        let result = AnalysisResult {
            headline: "Oil jumps".into(),
            summary: "Brent up 4%".into(),
            sentiment_score: 7,
            category: Category::Energy,
            affected_tickers: vec!["XOM".into()],
            impact: Impact::Positive,
            impact_reason: "Higher crude lifts margins".into(),
            risk_level: RiskLevel::Medium,
            related_sources: vec![],
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["category"], "Energy");
        assert_eq!(value["impact"], "positive");
        assert_eq!(value["risk_level"], "medium");
    }
}
