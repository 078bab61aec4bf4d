//! newsdesk - a news aggregation service.
//!
//! Fetches RSS and Atom feeds by category, normalizes items into articles,
//! optionally reorders them with an external relevance ranking service and
//! caches the result in a fast and a durable tier.

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod news;
pub mod rate_limit;
pub mod ranking;
pub mod web;

pub use cache::{CacheKey, KvStore, MemoryStore, NewsCache, SqliteStore};
pub use config::{Config, ConfigProvider};
pub use error::{FetchError, NewsError, Result};
pub use identity::Identity;
pub use news::{Article, FeedDescriptor, FeedOption, NewsAggregator, NewsRequest};
pub use rate_limit::{QuotaConfig, QuotaGuard, QuotaStatus};
pub use ranking::RelevanceFilter;
