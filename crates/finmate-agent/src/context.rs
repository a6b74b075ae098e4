//! Context assembly for chat and analysis prompts

use finmate_llm::{Message, Role};
use finmate_utils::truncate_chars;

use crate::news::AnalyzedNews;

/// Prior turns kept from the caller's conversation
pub const HISTORY_WINDOW: usize = 6;
/// Upper bound of the assembled context block, in characters
pub const MAX_CONTEXT_CHARS: usize = 24_000;
/// Upper bound of the uploaded document excerpt, in characters
pub const MAX_DOCUMENT_CHARS: usize = 10_000;
/// Analyzed news items listed in the context
pub const MAX_NEWS_ITEMS: usize = 10;

/// Builds the instruction context from portfolio, news and documents
///
/// Stateless; the only transformation besides formatting is truncation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    /// Assemble the context block
    ///
    /// `news` is expected most recent first; only the first
    /// [`MAX_NEWS_ITEMS`] are listed.
    pub fn assemble(portfolio: &[String], news: &[AnalyzedNews], document: Option<&str>) -> String {
        let mut sections = Vec::with_capacity(3);

        if portfolio.is_empty() {
            sections.push("Portfolio: (empty)".to_string());
        } else {
            sections.push(format!("Portfolio: {}", portfolio.join(", ")));
        }

        if !news.is_empty() {
            let lines: Vec<String> = news
                .iter()
                .take(MAX_NEWS_ITEMS)
                .map(|entry| {
                    format!(
                        "- {} (Impact: {}, Reason: {})",
                        entry.analysis.headline, entry.analysis.impact, entry.analysis.impact_reason
                    )
                })
                .collect();
            sections.push(format!("Latest News Analysis:\n{}", lines.join("\n")));
        }

        if let Some(doc) = document.map(str::trim).filter(|doc| !doc.is_empty()) {
            sections.push(format!(
                "Uploaded Document Context:\n{}",
                truncate_chars(doc, MAX_DOCUMENT_CHARS)
            ));
        }

        let context = sections.join("\n\n");
        truncate_chars(&context, MAX_CONTEXT_CHARS).to_string()
    }

    /// Keep the last [`HISTORY_WINDOW`] user/assistant messages
    ///
    /// Entries are rebuilt as plain text turns. Tool calls and tool results
    /// are dropped together, and so are assistant turns left without text.
    pub fn window_history(history: &[Message]) -> Vec<Message> {
        let conversational: Vec<Message> = history
            .iter()
            .filter_map(|m| match m.role {
                Role::User => Some(Message::user(m.text())),
                Role::Assistant if !m.text().trim().is_empty() => {
                    Some(Message::assistant(m.text()))
                }
                _ => None,
            })
            .collect();
        let skip = conversational.len().saturating_sub(HISTORY_WINDOW);
        conversational.into_iter().skip(skip).collect()
    }
}
