//! In-memory TTL cache for serialized handler responses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Status code plus serialized JSON body captured from one handler run.
///
/// Error responses are cached exactly like successes; replaying a cached 400
/// is the intended behavior for a repeated bad request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: CachedResponse,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl CacheInner {
    fn new(ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            ttl,
        }
    }

    fn get(&self, key: &str) -> Option<CachedResponse> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.response.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, response: CachedResponse) {
        let expires_at = Instant::now() + self.ttl;
        self.map.insert(key, CacheEntry { response, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Thread-safe response cache keyed by the literal request path.
///
/// Keys carry the exact parameter spellings from the URL, so two different
/// spellings of the same date are cached as distinct entries. Expired entries
/// are evicted lazily and recreated on the next miss.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(ttl))),
        }
    }

    /// Cache with the service default TTL of 5 minutes.
    pub fn with_default_ttl() -> Self {
        Self::new(Duration::from_secs(300))
    }

    /// Disabled cache: never stores, never hits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Stored response for `key` if present and not expired.
    pub async fn get(&self, key: &str) -> Option<CachedResponse> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Store a response under `key` with the fixed TTL.
    ///
    /// No-op when the cache is disabled.
    pub async fn put(&self, key: String, response: CachedResponse) {
        let mut store = self.inner.write().await;
        if store.ttl == Duration::ZERO {
            return;
        }
        store.put(key, response);
    }

    /// Drop entries whose TTL has elapsed.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    /// Number of stored entries, expired included.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> CachedResponse {
        CachedResponse {
            status,
            body: body.to_owned(),
        }
    }

    #[tokio::test]
    async fn miss_then_hit_then_overwrite() {
        let cache = ResponseCache::new(Duration::from_secs(1));

        assert!(cache.get("/exchange-rates/USD/2024-01-01").await.is_none());

        cache
            .put(
                "/exchange-rates/USD/2024-01-01".to_owned(),
                response(200, r#"{"rate":3.98}"#),
            )
            .await;
        assert_eq!(
            cache.get("/exchange-rates/USD/2024-01-01").await,
            Some(response(200, r#"{"rate":3.98}"#))
        );

        cache
            .put(
                "/exchange-rates/USD/2024-01-01".to_owned(),
                response(200, r#"{"rate":4.01}"#),
            )
            .await;
        assert_eq!(
            cache.get("/exchange-rates/USD/2024-01-01").await,
            Some(response(200, r#"{"rate":4.01}"#))
        );
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = ResponseCache::new(Duration::from_millis(100));

        cache.put("k".to_owned(), response(200, "{}")).await;
        assert!(cache.get("k").await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn error_responses_are_cached_too() {
        let cache = ResponseCache::new(Duration::from_secs(60));

        cache
            .put(
                "/sales/USD/not-a-date".to_owned(),
                response(400, r#"{"cause":"Invalid date format."}"#),
            )
            .await;
        let hit = cache.get("/sales/USD/not-a-date").await.expect("cached");
        assert_eq!(hit.status, 400);
    }

    #[tokio::test]
    async fn clear_expired_evicts_stale_entries() {
        let cache = ResponseCache::new(Duration::from_millis(100));

        cache.put("a".to_owned(), response(200, "{}")).await;
        cache.put("b".to_owned(), response(200, "{}")).await;
        assert_eq!(cache.len().await, 2);

        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.clear_expired().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = ResponseCache::disabled();

        cache.put("k".to_owned(), response(200, "{}")).await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.is_empty().await);
    }
}
