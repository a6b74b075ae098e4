//! DuckDuckGo web text search
//!
//! Queries the HTML results page, which needs no API key, and extracts the
//! organic hits from it. Sponsored entries are skipped.

use crate::error::{Result, ToolError};
use crate::search::{SearchHit, WebSearch};
use async_trait::async_trait;
use finmate_utils::preview;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const BASE_URL: &str = "https://html.duckduckgo.com/html/";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Extracts result links and snippets from the HTML results page
struct ResultParser {
    anchor: Regex,
    class: Regex,
    href: Regex,
    tag: Regex,
}

impl ResultParser {
    fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| ToolError::ConfigError(format!("bad pattern: {e}")))
        };
        Ok(Self {
            anchor: compile(r"(?s)<a\s([^>]*)>(.*?)</a>")?,
            class: compile(r#"class="([^"]*)""#)?,
            href: compile(r#"href="([^"]*)""#)?,
            tag: compile(r"<[^>]*>")?,
        })
    }

    /// Walk the anchors in page order
    ///
    /// A `result__a` anchor opens a hit; the next `result__snippet` anchor
    /// fills its snippet.
    fn parse(&self, html: &str, max_results: usize) -> Vec<SearchHit> {
        let mut hits: Vec<SearchHit> = Vec::new();
        let mut open = false;

        for anchor in self.anchor.captures_iter(html) {
            let attrs = &anchor[1];
            let Some(class) = self.class.captures(attrs) else {
                continue;
            };
            let classes = &class[1];

            if classes.split_whitespace().any(|c| c == "result__a") {
                if hits.len() >= max_results {
                    break;
                }
                let link = self
                    .href
                    .captures(attrs)
                    .and_then(|href| resolve_link(&decode_entities(&href[1])));
                open = link.is_some();
                if let Some(link) = link {
                    hits.push(SearchHit {
                        title: self.text(&anchor[2]),
                        link,
                        snippet: String::new(),
                    });
                }
            } else if open && classes.split_whitespace().any(|c| c == "result__snippet") {
                if let Some(hit) = hits.last_mut() {
                    hit.snippet = self.text(&anchor[2]);
                }
                open = false;
            }
        }

        hits
    }

    fn text(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, "");
        decode_entities(stripped.trim())
    }
}

/// Turn a result href into the target URL
///
/// Organic hits go through the `/l/?uddg=` redirect; ads go through `/y.js`
/// and resolve to `None`.
fn resolve_link(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    let is_ddg = url
        .host_str()
        .is_some_and(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"));
    if !is_ddg {
        return Some(url.to_string());
    }
    if url.path() != "/l/" {
        return None;
    }
    url.query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, target)| target.into_owned())
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// DuckDuckGo search client with rate limiting
pub struct DuckDuckGoClient {
    client: Client,
    rate_limiter: SharedRateLimiter,
    parser: ResultParser,
}

impl DuckDuckGoClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `rate_limit` - Requests per second
    /// * `timeout` - Per-request timeout
    pub fn new(rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("finmate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            rate_limiter,
            parser: ResultParser::new()?,
        })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(BASE_URL)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| ToolError::SearchError(format!("DuckDuckGo request failed: {e}")))?;

        let status = response.status();
        // 202 is the anti-automation page, not a result list
        if status == StatusCode::ACCEPTED || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ToolError::RateLimitExceeded {
                provider: "DuckDuckGo".to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::SearchError(format!(
                "DuckDuckGo error {status}: {}",
                preview(&body, 200)
            )));
        }

        let html = response.text().await?;
        let hits = self.parser.parse(&html, max_results);
        debug!(query = query, hits = hits.len(), "DuckDuckGo search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<div class="result results_links result--ad">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="https://duckduckgo.com/y.js?ad_provider=x&amp;u3=https%3A%2F%2Fads.example">Buy stocks now</a>
  </h2>
  <a class="result__snippet" href="https://duckduckgo.com/y.js?ad_provider=x">Sponsored</a>
</div>
<div class="result results_links results_links_deep web-result ">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.reuters.com%2Fmarkets%2Ffed%3Fid%3D1&amp;rut=abc">Fed holds rates <b>steady</b></a>
  </h2>
  <a class="result__url" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.reuters.com%2F">reuters.com</a>
  <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.reuters.com%2F">The Federal Reserve kept rates unchanged &amp; signaled <b>patience</b>.</a>
</div>
<div class="result results_links results_links_deep web-result ">
  <h2 class="result__title">
    <a class="result__a" rel="nofollow" href="https://www.cnbc.com/fed">Markets react to Fed&#x27;s decision</a>
  </h2>
  <a class="result__snippet" href="https://www.cnbc.com/fed">Stocks rose after the announcement.</a>
</div>
<div class="result results_links results_links_deep web-result ">
  <h2 class="result__title">
    <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.org%2Fthird">Third</a>
  </h2>
</div>
"#;

    fn parser() -> ResultParser {
        ResultParser::new().unwrap()
    }

    #[test]
    fn test_parse_organic_results() {
        let hits = parser().parse(PAGE, 5);

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].title, "Fed holds rates steady");
        assert_eq!(hits[0].link, "https://www.reuters.com/markets/fed?id=1");
        assert_eq!(
            hits[0].snippet,
            "The Federal Reserve kept rates unchanged & signaled patience."
        );
        assert_eq!(hits[1].title, "Markets react to Fed's decision");
        assert_eq!(hits[1].link, "https://www.cnbc.com/fed");
        assert_eq!(hits[1].snippet, "Stocks rose after the announcement.");
        assert_eq!(hits[2].link, "https://example.org/third");
        assert_eq!(hits[2].snippet, "");
    }

    #[test]
    fn test_parse_respects_limit() {
        let hits = parser().parse(PAGE, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Fed holds rates steady");
    }

    #[test]
    fn test_parse_page_without_results() {
        let html = r#"<div class="no-results">No results.</div><a href="/about">About</a>"#;
        assert!(parser().parse(html, 5).is_empty());
    }

    #[test]
    fn test_resolve_link() {
        assert_eq!(
            resolve_link("//duckduckgo.com/l/?uddg=https%3A%2F%2Fa.example%2Fx&rut=1").as_deref(),
            Some("https://a.example/x")
        );
        assert_eq!(resolve_link("https://duckduckgo.com/y.js?u3=x"), None);
        assert_eq!(resolve_link("not a url"), None);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_search() {
        let client = DuckDuckGoClient::new(1, Duration::from_secs(10)).unwrap();
        let hits = client.search("Federal Reserve interest rate decision", 3).await.unwrap();
        assert!(hits.len() <= 3);
    }
}
