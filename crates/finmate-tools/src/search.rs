//! Web search backend abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// Text search over the web
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return at most `max_results` hits for `query`
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Render hits the way the model sees them
pub fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }

    hits.iter()
        .map(|hit| {
            format!(
                "Title: {}\nLink: {}\nSnippet: {}",
                hit.title, hit.link, hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(n: u8) -> SearchHit {
        SearchHit {
            title: format!("Title {n}"),
            link: format!("https://news.example/{n}"),
            snippet: format!("Snippet {n}"),
        }
    }

    #[test]
    fn test_format_no_hits() {
        assert_eq!(format_hits(&[]), "No results found.");
    }

    #[test]
    fn test_format_hits() {
        let text = format_hits(&[hit(1), hit(2)]);
        assert_eq!(
            text,
            "Title: Title 1\nLink: https://news.example/1\nSnippet: Snippet 1\n---\n\
             Title: Title 2\nLink: https://news.example/2\nSnippet: Snippet 2"
        );
    }
}
