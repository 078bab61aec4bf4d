//! Key-value store abstraction shared by the cache tiers and quota counters.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::Result;

/// A string key-value store whose entries expire on their own.
///
/// Implementations enforce their own expiry: an entry older than the TTL it
/// was written with must read as absent.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write an entry, replacing any existing value and TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// In-process store used as the fast tier.
///
/// Contents are lost on restart. Expiry uses the tokio clock, so tests can
/// drive it with a paused runtime.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    capacity: usize,
}

impl MemoryStore {
    /// Create a store that sweeps expired entries once it holds `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Number of entries currently held, live or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if entries.len() >= self.capacity && !entries.contains_key(key) {
            entries.retain(|_, e| e.expires_at > now);

            // Still full: evict whatever expires first
            if entries.len() >= self.capacity {
                if let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.expires_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }
}
