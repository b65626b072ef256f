use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::types::CachedHttpResponse;

/// LRU cache of successful response bodies keyed by full request URL.
/// Owned by one fetch gateway; never persisted.
#[derive(Debug)]
pub struct ResponseCache {
    entries: RwLock<LruCache<String, CachedHttpResponse>>,
    ttl_seconds: u64,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl_seconds: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            ttl_seconds,
        }
    }

    /// Caches a response body
    #[instrument(skip(self, data), fields(url = %url))]
    pub async fn put(&self, url: String, data: String) {
        debug!(
            "Caching HTTP response: data_size={}, ttl={}s",
            data.len(),
            self.ttl_seconds
        );
        let mut cache = self.entries.write().await;
        cache.put(url, CachedHttpResponse::new(data, self.ttl_seconds));
    }

    /// Retrieves a cached response body if it's not expired
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Option<String> {
        let mut cache = self.entries.write().await;

        match cache.get(url) {
            Some(entry) if !entry.is_expired() => {
                debug!(
                    "Cache hit for HTTP response: age={:?}",
                    entry.cached_at.elapsed()
                );
                Some(entry.data.clone())
            }
            Some(entry) => {
                warn!(
                    "Removing expired HTTP response cache entry: age={:?}, ttl={:?}",
                    entry.cached_at.elapsed(),
                    Duration::from_secs(entry.ttl_seconds)
                );
                cache.pop(url);
                None
            }
            None => {
                debug!("Cache miss for HTTP response");
                None
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
