//! The news read path.
//!
//! A request is answered from cache when possible. Otherwise the feed for
//! the category is fetched and normalized, optionally ranked, then cached.
//! A failed fetch is answered with the demo corpus, which is not cached.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, KvStore, MemoryStore, NewsCache};
use crate::config::{Config, ConfigProvider};
use crate::identity::Identity;
use crate::news::demo::demo_articles;
use crate::news::fetcher::FeedFetcher;
use crate::news::normalizer::normalize;
use crate::news::registry::FeedRegistry;
use crate::news::types::{
    Article, DEFAULT_CATEGORY, DEFAULT_COUNT, MAX_COUNT, RANKING_OVERFETCH_FACTOR,
};
use crate::ranking::RelevanceFilter;
use crate::Result;

/// Parameters of a news request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRequest {
    /// Maximum number of articles to return.
    pub count: usize,
    /// Category id.
    pub category: String,
    /// Whether to rank candidates against `criteria`.
    pub use_ai: bool,
    /// Free-text ranking criteria.
    pub criteria: String,
}

impl NewsRequest {
    /// Create an unranked request. `count` is clamped to `1..=MAX_COUNT`.
    pub fn new(count: usize, category: impl Into<String>) -> Self {
        Self {
            count: count.clamp(1, MAX_COUNT),
            category: category.into(),
            use_ai: false,
            criteria: String::new(),
        }
    }

    /// Ask for ranking against `criteria`.
    pub fn with_ranking(mut self, criteria: impl Into<String>) -> Self {
        self.use_ai = true;
        self.criteria = criteria.into();
        self
    }

    /// Set the ranking flag and criteria independently.
    pub fn with_ai(mut self, use_ai: bool, criteria: impl Into<String>) -> Self {
        self.use_ai = use_ai;
        self.criteria = criteria.into();
        self
    }

    /// Cache slot for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::for_request(&self.category, self.count, self.use_ai, &self.criteria)
    }

    /// Raw items to take from the feed.
    pub fn fetch_limit(&self) -> usize {
        if self.use_ai {
            self.count * RANKING_OVERFETCH_FACTOR
        } else {
            self.count
        }
    }

    /// Whether the ranking step applies.
    fn wants_ranking(&self) -> bool {
        self.use_ai && !self.criteria.trim().is_empty()
    }
}

impl Default for NewsRequest {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT, DEFAULT_CATEGORY)
    }
}

/// Composes registry, fetcher, normalizer, ranking and cache.
pub struct NewsAggregator {
    registry: FeedRegistry,
    fetcher: FeedFetcher,
    filter: RelevanceFilter,
    cache: NewsCache,
}

impl NewsAggregator {
    /// Create an aggregator from its parts.
    pub fn new(
        registry: FeedRegistry,
        fetcher: FeedFetcher,
        filter: RelevanceFilter,
        cache: NewsCache,
    ) -> Self {
        Self {
            registry,
            fetcher,
            filter,
            cache,
        }
    }

    /// Wire an aggregator from configuration.
    ///
    /// The fast tier is an in-process [`MemoryStore`]; `durable` backs the
    /// durable tier and the ranking quota counters.
    pub fn from_config(config: Arc<Config>, durable: Arc<dyn KvStore>) -> Result<Self> {
        let provider: Arc<dyn ConfigProvider> = config.clone();
        let fast: Arc<dyn KvStore> = Arc::new(MemoryStore::new(config.cache.fast_capacity));

        Ok(Self::new(
            FeedRegistry::new(provider.clone()),
            FeedFetcher::new(&config.fetch)?,
            RelevanceFilter::new(&config.ranking, provider, durable.clone())?,
            NewsCache::new(fast, durable, Duration::from_secs(config.cache.ttl_secs)),
        ))
    }

    /// The feed registry.
    pub fn registry(&self) -> &FeedRegistry {
        &self.registry
    }

    /// The relevance filter.
    pub fn filter(&self) -> &RelevanceFilter {
        &self.filter
    }

    /// Fetch news for a request.
    ///
    /// Never fails and never returns more than `request.count` articles.
    #[tracing::instrument(
        skip_all,
        fields(category = %request.category, count = request.count, use_ai = request.use_ai)
    )]
    pub async fn fetch_news(&self, request: &NewsRequest, identity: &Identity) -> Vec<Article> {
        let request = NewsRequest {
            count: request.count.clamp(1, MAX_COUNT),
            ..request.clone()
        };
        let key = request.cache_key();

        if let Some(entry) = self.cache.get(&key).await {
            debug!(key = %key, "Serving cached news");
            return entry.articles;
        }

        let feed = self.registry.resolve(&request.category);

        let parsed = match self.fetcher.fetch(&feed.url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(url = %feed.url, feed = %feed.id, error = %e, "Feed fetch failed, serving demo articles");
                return demo_articles(request.count);
            }
        };

        let candidates: Vec<Article> = parsed
            .items
            .iter()
            .take(request.fetch_limit())
            .map(normalize)
            .collect();

        let articles = if request.wants_ranking() && !candidates.is_empty() {
            self.filter
                .rank(candidates, &request.criteria, request.count, identity)
                .await
        } else {
            let mut articles = candidates;
            articles.truncate(request.count);
            articles
        };

        info!(feed = %feed.id, returned = articles.len(), "Fetched news");
        self.cache.put(&key, &articles).await;
        articles
    }
}
