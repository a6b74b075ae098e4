//! Single-shot news scoring with a deterministic fallback

use finmate_llm::{CompletionClient, CompletionRequest, LLMError, Message, ResponseFormat};
use finmate_tools::ToolRegistry;
use finmate_utils::{preview, truncate_chars};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::context::ContextAssembler;
use crate::error::AnalysisDecodeError;
use crate::news::{
    AnalysisResult, AnalysisSource, AnalyzedNews, Category, Impact, NewsItem, RiskLevel,
};
use crate::prompts::{
    ANALYSIS_SCHEMA_NAME, analysis_schema, analysis_system_prompt, analysis_user_prompt,
};

/// Sentiment used when the model could not score an item
pub const NEUTRAL_SENTIMENT: u8 = 5;

const FALLBACK_REASON: &str = "AI analysis failed.";
const FALLBACK_SUMMARY_CHARS: usize = 100;

/// Structured output mode tried for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Schema-constrained output
    JsonSchema,
    /// Plain JSON mode
    JsonObject,
}

impl OutputFormat {
    /// Strategies tried in order until one is accepted by the client
    pub const DEFAULT_CHAIN: [OutputFormat; 2] =
        [OutputFormat::JsonSchema, OutputFormat::JsonObject];

    fn response_format(self) -> ResponseFormat {
        match self {
            Self::JsonSchema => ResponseFormat::JsonSchema {
                name: ANALYSIS_SCHEMA_NAME.to_string(),
                schema: analysis_schema(),
                strict: true,
            },
            Self::JsonObject => ResponseFormat::JsonObject,
        }
    }
}

/// Outcome of one structured-output attempt
#[derive(Debug)]
enum AttemptOutcome {
    Decoded(AnalysisResult),
    DecodeError(AnalysisDecodeError),
    /// The client rejected this request shape
    Unsupported(LLMError),
    TransportError(LLMError),
}

/// Scores news items against a portfolio
pub struct AnalysisAdapter {
    client: Arc<dyn CompletionClient>,
    tools: Option<Arc<ToolRegistry>>,
    config: AgentConfig,
    formats: Vec<OutputFormat>,
}

impl AnalysisAdapter {
    pub fn new(client: Arc<dyn CompletionClient>, config: AgentConfig) -> Self {
        Self {
            client,
            tools: None,
            config,
            formats: OutputFormat::DEFAULT_CHAIN.to_vec(),
        }
    }

    /// Enrich prompts with a web search on the headline
    ///
    /// Only used while `search_enrichment` is enabled in the config.
    pub fn with_search(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Replace the output format chain
    pub fn with_formats(mut self, formats: Vec<OutputFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Score one item; never fails
    pub async fn analyze(&self, item: &NewsItem, portfolio: &[String]) -> AnalyzedNews {
        info!(
            title = %preview(&item.title, 80),
            portfolio_size = portfolio.len(),
            "Analyzing news item"
        );

        let web_context = self.enrichment(item).await;
        let context = ContextAssembler::assemble(portfolio, &[], None);
        let base = CompletionRequest::builder(&self.config.model)
            .add_message(Message::system(analysis_system_prompt()))
            .add_message(Message::user(analysis_user_prompt(
                item,
                &context,
                web_context.as_deref(),
            )))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.analysis_temperature)
            .build();

        for &format in &self.formats {
            match self.attempt(base.with_response_format(format.response_format())).await {
                AttemptOutcome::Decoded(analysis) => {
                    info!(
                        format = ?format,
                        sentiment = analysis.sentiment_score,
                        impact = %analysis.impact,
                        "News item scored"
                    );
                    return AnalyzedNews {
                        item: item.clone(),
                        analysis,
                        source: AnalysisSource::Model,
                    };
                }
                AttemptOutcome::Unsupported(e) => {
                    warn!(format = ?format, error = %e, "Output format rejected, trying next");
                }
                AttemptOutcome::DecodeError(e) => {
                    warn!(format = ?format, error = %e, "Reply did not decode, using fallback");
                    break;
                }
                AttemptOutcome::TransportError(e) => {
                    warn!(format = ?format, error = %e, "Completion failed, using fallback");
                    break;
                }
            }
        }

        AnalyzedNews {
            item: item.clone(),
            analysis: fallback_analysis(item, portfolio),
            source: AnalysisSource::Fallback,
        }
    }

    /// Score items one after another, keeping input order
    pub async fn analyze_batch(
        &self,
        items: &[NewsItem],
        portfolio: &[String],
    ) -> Vec<AnalyzedNews> {
        let mut analyzed = Vec::with_capacity(items.len());
        for item in items {
            analyzed.push(self.analyze(item, portfolio).await);
        }
        analyzed
    }

    async fn enrichment(&self, item: &NewsItem) -> Option<String> {
        if !self.config.search_enrichment {
            return None;
        }
        let tools = self.tools.as_ref()?;
        let query = item.title.trim();
        if query.is_empty() {
            return None;
        }

        match tools.search_web(query).await {
            Ok(text) => {
                debug!(context = %preview(&text, 200), "Search enrichment");
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, "Search enrichment failed");
                Some(format!("Web search unavailable: {e}"))
            }
        }
    }

    async fn attempt(&self, request: CompletionRequest) -> AttemptOutcome {
        match self.client.complete(request).await {
            Ok(response) => match decode_analysis(response.message.text()) {
                Ok(analysis) => AttemptOutcome::Decoded(analysis),
                Err(e) => AttemptOutcome::DecodeError(e),
            },
            Err(e) if e.is_unsupported_request() => AttemptOutcome::Unsupported(e),
            Err(e) => AttemptOutcome::TransportError(e),
        }
    }
}

/// Reply shape before validation
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    headline: String,
    summary: String,
    sentiment_score: f64,
    category: String,
    affected_tickers: Vec<String>,
    impact: String,
    impact_reason: String,
    risk_level: String,
    #[serde(default)]
    related_sources: Option<Vec<String>>,
}

/// Decode and validate a model reply
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence.
pub fn decode_analysis(text: &str) -> Result<AnalysisResult, AnalysisDecodeError> {
    let raw: RawAnalysis = serde_json::from_str(strip_code_fence(text))?;

    if !(0.0..=10.0).contains(&raw.sentiment_score) {
        return Err(AnalysisDecodeError::SentimentOutOfRange(raw.sentiment_score));
    }

    let impact: Impact = raw.impact.parse().map_err(|_| AnalysisDecodeError::InvalidLabel {
        field: "impact",
        label: raw.impact.clone(),
    })?;
    let risk_level: RiskLevel = raw
        .risk_level
        .parse()
        .map_err(|_| AnalysisDecodeError::InvalidLabel {
            field: "risk_level",
            label: raw.risk_level.clone(),
        })?;

    let affected_tickers = raw
        .affected_tickers
        .iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect();

    Ok(AnalysisResult {
        headline: raw.headline,
        summary: raw.summary,
        sentiment_score: raw.sentiment_score.round() as u8,
        category: Category::from_label(&raw.category),
        affected_tickers,
        impact,
        impact_reason: raw.impact_reason,
        risk_level,
        related_sources: raw.related_sources.unwrap_or_default(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body
        .strip_prefix("json")
        .or_else(|| body.strip_prefix("JSON"))
        .unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Deterministic analysis used when the model path fails
///
/// Tickers match by case-insensitive substring of title and summary, so
/// company names without the literal ticker are not detected.
pub fn fallback_analysis(item: &NewsItem, portfolio: &[String]) -> AnalysisResult {
    let haystack = format!("{} {}", item.title, item.summary).to_uppercase();
    let affected_tickers = portfolio
        .iter()
        .filter(|ticker| {
            let needle = ticker.trim().to_uppercase();
            !needle.is_empty() && haystack.contains(&needle)
        })
        .cloned()
        .collect();

    let headline = if item.title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        item.title.clone()
    };

    AnalysisResult {
        headline,
        summary: format!(
            "AI Analysis Unavailable. Content: {}...",
            truncate_chars(&item.summary, FALLBACK_SUMMARY_CHARS)
        ),
        sentiment_score: NEUTRAL_SENTIMENT,
        category: Category::General,
        affected_tickers,
        impact: Impact::Neutral,
        impact_reason: FALLBACK_REASON.to_string(),
        risk_level: RiskLevel::Low,
        related_sources: Vec::new(),
    }
}
