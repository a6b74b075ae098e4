//! Prompt text and the analysis output schema

use finmate_llm::tools::schema;
use serde_json::{Value, json};

use crate::news::NewsItem;

/// Name of the structured output schema sent with analysis requests
pub const ANALYSIS_SCHEMA_NAME: &str = "news_analysis";

/// System instruction for a chat run
pub fn chat_system_prompt(context: &str, today: &str) -> String {
    format!(
        "You are FinMate, an expert financial assistant. Today is {today}.\n\n\
         Context (portfolio, news, documents):\n{context}\n\n\
         Instructions:\n\
         - Answer the user's question from the context when it is enough.\n\
         - For current data that is not in the context, call the tools: \
         get_stock_price for prices, get_fundamentals for valuation, \
         get_technical_indicators for RSI and moving averages, search_web for news.\n\
         - Be concise, professional and helpful. Do not invent numbers."
    )
}

/// System instruction for news scoring
pub fn analysis_system_prompt() -> &'static str {
    "You are a helpful financial analyst. You always respond in valid JSON."
}

/// User message for scoring one news item
///
/// `context` is the assembled context block. `web_context` is the search
/// enrichment text when enrichment ran.
pub fn analysis_user_prompt(item: &NewsItem, context: &str, web_context: Option<&str>) -> String {
    let mut prompt = format!(
        "Analyze the following news article and determine its impact on the user's portfolio.\n\n\
         {context}\n\n\
         News Title: {}\n\
         News Summary: {}\n\
         News Source: {}\n\
         News Link: {}\n",
        item.title, item.summary, item.source, item.link
    );

    if let Some(web) = web_context {
        prompt.push_str("\nWeb Search Context:\n");
        prompt.push_str(web);
        prompt.push('\n');
    }

    prompt.push_str(
        "\nInstructions:\n\
         - Infer whether the news affects a portfolio company \
         even when its ticker is not mentioned.\n\
         - News about a competitor or the sector may also be relevant.\n\
         - Be critical and use the full sentiment range: \
         0 is catastrophic, 5 neutral, 10 euphoric.\n\n\
         Return a JSON object with these fields:\n\
         headline (string), summary (string), sentiment_score (integer 0-10), \
         category (Markets | Macro | Equities | Energy | Tech | General), \
         affected_tickers (array of tickers), impact (positive | neutral | negative), \
         impact_reason (string), risk_level (low | medium | high), \
         related_sources (array of URLs)",
    );

    prompt
}

/// JSON schema for analysis output, in strict form
///
/// Strict mode wants every property listed as required and no extra keys.
pub fn analysis_schema() -> Value {
    let mut schema = schema::object(
        json!({
            "headline": schema::string("Short, punchy headline"),
            "summary": schema::string("Concise summary of the event"),
            "sentiment_score": schema::integer("0 = catastrophic, 5 = neutral, 10 = euphoric"),
            "category": schema::string_enum(
                "News category",
                &["Markets", "Macro", "Equities", "Energy", "Tech", "General"],
            ),
            "affected_tickers": schema::array(
                "Portfolio tickers affected by the news",
                json!({ "type": "string" }),
            ),
            "impact": schema::string_enum(
                "Effect on the portfolio",
                &["positive", "neutral", "negative"],
            ),
            "impact_reason": schema::string("Why the news affects the portfolio or tickers"),
            "risk_level": schema::string_enum("Risk level", &["low", "medium", "high"]),
            "related_sources": schema::array(
                "Corroborating source URLs",
                json!({ "type": "string" }),
            ),
        }),
        &[
            "headline",
            "summary",
            "sentiment_score",
            "category",
            "affected_tickers",
            "impact",
            "impact_reason",
            "risk_level",
            "related_sources",
        ],
    );
    schema["additionalProperties"] = json!(false);
    schema
}
