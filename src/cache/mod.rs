//! Two-tier result cache.
//!
//! The fast tier is a cache of the durable tier: reads try the fast tier,
//! then the durable tier, copying durable hits back into the fast tier.
//! Writes go to both. Each tier expires entries on its own.

pub mod sqlite;
pub mod store;

pub use sqlite::SqliteStore;
pub use store::{KvStore, MemoryStore};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::news::Article;

/// Default entry lifetime (15 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(900);

/// Fingerprint of the parameters that shape a news result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a request.
    ///
    /// The tuple is JSON-encoded before hashing so that field boundaries
    /// cannot be confused (`("a1", 5)` vs `("a", 15)`).
    pub fn for_request(category: &str, count: usize, use_ai: bool, criteria: &str) -> Self {
        let encoded = serde_json::json!([category, count, use_ai, criteria]).to_string();
        let digest = Sha256::digest(encoded.as_bytes());
        Self(format!("news_{:x}", digest))
    }

    /// The key as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Articles in final order.
    pub articles: Vec<Article>,
    /// When the entry was produced.
    pub written_at: DateTime<Utc>,
}

/// Facade over the fast and durable tiers.
pub struct NewsCache {
    fast: Arc<dyn KvStore>,
    durable: Arc<dyn KvStore>,
    ttl: Duration,
}

impl NewsCache {
    /// Create a cache over the given tiers.
    pub fn new(fast: Arc<dyn KvStore>, durable: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { fast, durable, ttl }
    }

    /// Entry lifetime applied to both tiers.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up an entry.
    ///
    /// A durable-tier hit is written back to the fast tier with a full TTL
    /// before it is returned. Store failures are logged and read as a miss.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        if let Some(entry) = read_tier(self.fast.as_ref(), key, "fast").await {
            debug!(key = %key, "Fast tier cache hit");
            return Some(entry);
        }

        let raw = match self.durable.get(key.as_str()).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "Durable tier read failed");
                return None;
            }
        };

        let entry = decode(key, &raw, "durable")?;
        debug!(key = %key, "Durable tier cache hit, repopulating fast tier");

        if let Err(e) = self.fast.set(key.as_str(), &raw, self.ttl).await {
            warn!(key = %key, error = %e, "Fast tier repopulation failed");
        }

        Some(entry)
    }

    /// Store a result list in both tiers, replacing any existing entry.
    pub async fn put(&self, key: &CacheKey, articles: &[Article]) {
        let entry = CacheEntry {
            articles: articles.to_vec(),
            written_at: Utc::now(),
        };

        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.fast.set(key.as_str(), &raw, self.ttl).await {
            warn!(key = %key, error = %e, "Fast tier write failed");
        }
        if let Err(e) = self.durable.set(key.as_str(), &raw, self.ttl).await {
            warn!(key = %key, error = %e, "Durable tier write failed");
        }
    }
}

async fn read_tier(store: &dyn KvStore, key: &CacheKey, tier: &str) -> Option<CacheEntry> {
    match store.get(key.as_str()).await {
        Ok(raw) => decode(key, &raw?, tier),
        Err(e) => {
            warn!(key = %key, tier, error = %e, "Cache tier read failed");
            None
        }
    }
}

fn decode(key: &CacheKey, raw: &str, tier: &str) -> Option<CacheEntry> {
    match serde_json::from_str(raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!(key = %key, tier, error = %e, "Discarding undecodable cache entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::NewsError;

    fn articles() -> Vec<Article> {
        vec![
            Article::new("One", "https://example.com/1", "first"),
            Article::new("Two", "https://example.com/2", "second").with_image("https://example.com/2.jpg"),
        ]
    }

    fn cache() -> (NewsCache, Arc<MemoryStore>, Arc<MemoryStore>) {
        let fast = Arc::new(MemoryStore::default());
        let durable = Arc::new(MemoryStore::default());
        (
            NewsCache::new(fast.clone(), durable.clone(), DEFAULT_TTL),
            fast,
            durable,
        )
    }

    struct FailingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl KvStore for FailingStore {
        async fn get(&self, _key: &str) -> crate::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(NewsError::Store("down".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> crate::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(NewsError::Store("down".to_string()))
        }
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = CacheKey::for_request("all", 5, true, "tech");
        let b = CacheKey::for_request("all", 5, true, "tech");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("news_"));
        assert_eq!(a.as_str().len(), "news_".len() + 64);
    }

    #[test]
    fn test_key_sensitive_to_every_field() {
        let base = CacheKey::for_request("all", 5, false, "tech");
        assert_ne!(base, CacheKey::for_request("world", 5, false, "tech"));
        assert_ne!(base, CacheKey::for_request("all", 6, false, "tech"));
        assert_ne!(base, CacheKey::for_request("all", 5, true, "tech"));
        assert_ne!(base, CacheKey::for_request("all", 5, false, "sport"));
    }

    #[test]
    fn test_key_field_boundaries() {
        assert_ne!(
            CacheKey::for_request("a1", 5, false, ""),
            CacheKey::for_request("a", 15, false, "")
        );
        assert_ne!(
            CacheKey::for_request("x", 1, false, "1"),
            CacheKey::for_request("x", 11, false, "")
        );
    }

    #[tokio::test]
    async fn test_miss() {
        let (cache, _, _) = cache();
        assert!(cache.get(&CacheKey::for_request("all", 5, false, "")).await.is_none());
    }

    #[tokio::test]
    async fn test_put_writes_both_tiers() {
        let (cache, fast, durable) = cache();
        let key = CacheKey::for_request("all", 2, false, "");
        cache.put(&key, &articles()).await;

        assert!(fast.get(key.as_str()).await.unwrap().is_some());
        assert!(durable.get(key.as_str()).await.unwrap().is_some());
        assert_eq!(cache.get(&key).await.unwrap().articles, articles());
    }

    #[tokio::test]
    async fn test_durable_hit_repopulates_fast_tier() {
        let (cache, fast, durable) = cache();
        let key = CacheKey::for_request("all", 2, false, "");
        let raw = serde_json::to_string(&CacheEntry {
            articles: articles(),
            written_at: Utc::now(),
        })
        .unwrap();
        durable.set(key.as_str(), &raw, DEFAULT_TTL).await.unwrap();
        assert!(fast.is_empty().await);

        let entry = cache.get(&key).await.unwrap();
        assert_eq!(entry.articles, articles());
        assert_eq!(fast.get(key.as_str()).await.unwrap().as_deref(), Some(raw.as_str()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tiers_expire_independently() {
        let fast = Arc::new(MemoryStore::default());
        let durable = Arc::new(MemoryStore::default());
        let cache = NewsCache::new(fast.clone(), durable.clone(), DEFAULT_TTL);
        let key = CacheKey::for_request("all", 2, false, "");

        cache.put(&key, &articles()).await;
        // Only the fast tier is refreshed here
        tokio::time::advance(Duration::from_secs(600)).await;
        let raw = fast.get(key.as_str()).await.unwrap().unwrap();
        fast.set(key.as_str(), &raw, DEFAULT_TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        assert!(durable.get(key.as_str()).await.unwrap().is_none());
        assert!(cache.get(&key).await.is_some());
    }

    #[tokio::test]
    async fn test_store_failures_are_misses() {
        let failing = Arc::new(FailingStore {
            calls: AtomicUsize::new(0),
        });
        let cache = NewsCache::new(failing.clone(), failing.clone(), DEFAULT_TTL);
        let key = CacheKey::for_request("all", 2, false, "");

        cache.put(&key, &articles()).await;
        assert!(cache.get(&key).await.is_none());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let (cache, fast, _) = cache();
        let key = CacheKey::for_request("all", 2, false, "");
        fast.set(key.as_str(), "not json", DEFAULT_TTL).await.unwrap();
        assert!(cache.get(&key).await.is_none());
    }
}
