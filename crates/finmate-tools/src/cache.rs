//! TTL caches for per-ticker tool payloads

use cached::{Cached, TimedCache};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Ticker plus the lookup that produced the payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    /// "quote", "technicals", "fundamentals"
    pub endpoint: &'static str,
}

impl CacheKey {
    pub fn new(ticker: impl Into<String>, endpoint: &'static str) -> Self {
        Self {
            ticker: ticker.into(),
            endpoint,
        }
    }
}

/// Shared TTL cache of JSON payloads
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<TimedCache<CacheKey, Value>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Fresh payload for `key`, if any
    pub async fn get(&self, key: &CacheKey) -> Option<Value> {
        // expiry is checked on read, which mutates the cache
        self.entries.write().await.cache_get(key).cloned()
    }

    pub async fn insert(&self, key: CacheKey, value: Value) {
        let _ = self.entries.write().await.cache_set(key, value);
    }

    /// Return the cached payload or run `fetch` and store its result
    ///
    /// Failed fetches leave the cache untouched.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, fetch: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(hit) = self.get(&key).await {
            debug!(ticker = %key.ticker, endpoint = key.endpoint, "Tool cache hit");
            return Ok(hit);
        }

        debug!(ticker = %key.ticker, endpoint = key.endpoint, "Tool cache miss");
        let fetched = fetch().await?;
        self.insert(key, fetched.clone()).await;
        Ok(fetched)
    }

    pub async fn clear(&self) {
        self.entries.write().await.cache_clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// The registry's two caches, split by how fast the data goes stale
#[derive(Clone)]
pub struct ToolCaches {
    /// Quotes and technical indicators
    pub realtime: ResponseCache,
    /// Company fundamentals
    pub fundamental: ResponseCache,
}

impl ToolCaches {
    pub fn new(realtime_ttl: Duration, fundamental_ttl: Duration) -> Self {
        Self {
            realtime: ResponseCache::new(realtime_ttl),
            fundamental: ResponseCache::new(fundamental_ttl),
        }
    }

    pub async fn clear_all(&self) {
        self.realtime.clear().await;
        self.fundamental.clear().await;
    }
}
