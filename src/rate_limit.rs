//! Sliding-expiry quota for ranking service calls.
//!
//! Each identity gets a `{count, expires_at}` record in a shared store.
//! Every recorded call pushes the expiry a full window ahead; the count
//! only resets once an identity stays idle for a whole window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::KvStore;
use crate::identity::Identity;
use crate::Result;

/// Configuration for quota enforcement.
#[derive(Debug, Clone, Copy)]
pub struct QuotaConfig {
    /// Maximum calls allowed in the window.
    pub max_calls: u32,
    /// Window length.
    pub window: Duration,
}

impl QuotaConfig {
    /// Create a new quota configuration.
    pub fn new(max_calls: u32, window_secs: u64) -> Self {
        Self {
            max_calls,
            window: Duration::from_secs(window_secs),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_calls: 100,
            window: Duration::from_secs(3600),
        }
    }
}

/// Result of a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaStatus {
    /// A call may be made.
    Allowed {
        /// Calls left in the current window, including this one.
        remaining: u32,
    },
    /// The window's allowance is used up.
    Exhausted {
        /// Time until the window lapses.
        retry_after: Duration,
    },
}

impl QuotaStatus {
    /// Check if a call is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaStatus::Allowed { .. })
    }
}

/// Stored counter for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaCounter {
    /// Calls recorded in the window.
    pub count: u32,
    /// When the window lapses.
    pub expires_at: DateTime<Utc>,
}

/// Per-identity call quota.
pub struct QuotaGuard {
    store: Arc<dyn KvStore>,
    config: QuotaConfig,
}

impl QuotaGuard {
    /// Create a guard that keeps its counters in `store`.
    pub fn new(store: Arc<dyn KvStore>, config: QuotaConfig) -> Self {
        Self { store, config }
    }

    /// Store key for an identity's counter.
    pub fn counter_key(identity: &Identity) -> String {
        format!("ai_calls_{}", identity.key())
    }

    /// Read the live counter for an identity, if any.
    pub async fn counter(&self, identity: &Identity) -> Result<Option<QuotaCounter>> {
        let Some(raw) = self.store.get(&Self::counter_key(identity)).await? else {
            return Ok(None);
        };
        let counter: QuotaCounter = serde_json::from_str(&raw)?;
        Ok(Some(counter).filter(|c| c.expires_at > Utc::now()))
    }

    /// Check whether an identity may make another call.
    ///
    /// This does not record the call; call `record_success()` afterwards.
    pub async fn check(&self, identity: &Identity) -> Result<QuotaStatus> {
        let status = match self.counter(identity).await? {
            Some(counter) if counter.count >= self.config.max_calls => QuotaStatus::Exhausted {
                retry_after: (counter.expires_at - Utc::now()).to_std().unwrap_or_default(),
            },
            Some(counter) => QuotaStatus::Allowed {
                remaining: self.config.max_calls - counter.count,
            },
            None => QuotaStatus::Allowed {
                remaining: self.config.max_calls,
            },
        };
        Ok(status)
    }

    /// Record a successful call.
    ///
    /// Increments the live counter, or starts from one when none is live.
    /// Every recorded call restarts the full window. Concurrent callers may
    /// race; the store only guarantees single-key atomicity.
    pub async fn record_success(&self, identity: &Identity) -> Result<QuotaCounter> {
        let count = self
            .counter(identity)
            .await?
            .map_or(1, |counter| counter.count.saturating_add(1));

        let window = chrono::Duration::from_std(self.config.window)
            .unwrap_or_else(|_| chrono::Duration::hours(1));
        let counter = QuotaCounter {
            count,
            expires_at: Utc::now() + window,
        };

        self.store
            .set(
                &Self::counter_key(identity),
                &serde_json::to_string(&counter)?,
                self.config.window,
            )
            .await?;

        Ok(counter)
    }
}
