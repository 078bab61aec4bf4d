//! Relevance filtering of candidate articles.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::KvStore;
use crate::config::{ConfigProvider, RankingConfig};
use crate::identity::Identity;
use crate::news::Article;
use crate::rate_limit::{QuotaConfig, QuotaGuard, QuotaStatus};
use crate::ranking::client::ChatClient;
use crate::ranking::parse::{parse_rankings, ParseError, Ranking};
use crate::Result;

/// Characters of the criteria echoed in slow-call diagnostics.
const CRITERIA_LOG_CHARS: usize = 50;

/// Why ranking was skipped. Never returned to callers.
#[derive(Debug, Error)]
enum Degradation {
    #[error("no ranking credential configured")]
    MissingCredential,
    #[error("quota exhausted, retry after {0:?}")]
    QuotaExhausted(Duration),
    #[error("quota store unavailable: {0}")]
    QuotaStore(String),
    #[error("ranking service failed: {0}")]
    Service(String),
    #[error("unusable ranking reply: {0}")]
    Unparsable(#[from] ParseError),
}

/// Reorders candidates by an external relevance service.
pub struct RelevanceFilter {
    client: ChatClient,
    quota: QuotaGuard,
    provider: Arc<dyn ConfigProvider>,
    slow_threshold: Duration,
}

impl RelevanceFilter {
    /// Create a filter.
    ///
    /// Quota counters are kept in `counter_store`; the credential is read
    /// from `provider` on every call.
    pub fn new(
        config: &RankingConfig,
        provider: Arc<dyn ConfigProvider>,
        counter_store: Arc<dyn KvStore>,
    ) -> Result<Self> {
        Ok(Self {
            client: ChatClient::new(config)?,
            quota: QuotaGuard::new(
                counter_store,
                QuotaConfig::new(config.max_calls_per_window, config.window_secs),
            ),
            provider,
            slow_threshold: Duration::from_secs_f64(config.slow_threshold_secs.max(0.0)),
        })
    }

    /// The quota guard used by this filter.
    pub fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    /// Rank `articles` against `criteria` and keep at most `limit`.
    ///
    /// Any failure degrades to the first `limit` articles in their original
    /// order. The identity's quota is charged only when the reply is usable.
    pub async fn rank(
        &self,
        articles: Vec<Article>,
        criteria: &str,
        limit: usize,
        identity: &Identity,
    ) -> Vec<Article> {
        match self.try_rank(&articles, criteria, limit, identity).await {
            Ok(rankings) => {
                if let Err(e) = self.quota.record_success(identity).await {
                    warn!(identity = %identity, error = %e, "Failed to record ranking call");
                }
                apply_rankings(articles, &rankings, limit)
            }
            Err(reason) => {
                warn!(identity = %identity, reason = %reason, "Ranking skipped, keeping feed order");
                truncated(articles, limit)
            }
        }
    }

    async fn try_rank(
        &self,
        articles: &[Article],
        criteria: &str,
        limit: usize,
        identity: &Identity,
    ) -> std::result::Result<Vec<Ranking>, Degradation> {
        match self.quota.check(identity).await {
            Ok(QuotaStatus::Allowed { remaining }) => {
                debug!(identity = %identity, remaining, "Ranking quota available");
            }
            Ok(QuotaStatus::Exhausted { retry_after }) => {
                return Err(Degradation::QuotaExhausted(retry_after));
            }
            Err(e) => return Err(Degradation::QuotaStore(e.to_string())),
        }

        let api_key = self
            .provider
            .ranking_credential()
            .ok_or(Degradation::MissingCredential)?;

        let prompt = build_prompt(articles, criteria, limit);

        let started = Instant::now();
        let reply = self.client.complete(&api_key, &prompt).await;
        let elapsed = started.elapsed();

        if elapsed > self.slow_threshold {
            let criteria_preview: String = criteria.chars().take(CRITERIA_LOG_CHARS).collect();
            warn!(
                elapsed_secs = elapsed.as_secs_f64(),
                criteria = %criteria_preview,
                "Slow ranking call detected"
            );
        }

        let reply = reply.map_err(|e| Degradation::Service(e.to_string()))?;
        Ok(parse_rankings(&reply)?)
    }
}

/// Build the ranking instruction for a candidate list.
pub fn build_prompt(articles: &[Article], criteria: &str, limit: usize) -> String {
    let mut listing = String::new();
    for (i, article) in articles.iter().enumerate() {
        let _ = write!(
            listing,
            "[{}] Title: {}\nDescription: {}\n\n",
            i, article.title, article.description
        );
    }

    format!(
        "Based on the user criteria: '{criteria}'\n\n\
         Rank the following news articles by relevance (0-10 scale). \
         Return ONLY a JSON array of objects with 'index' and 'score' properties, \
         ordered by score (highest first). Limit to top {limit} articles.\n\n\
         Articles:\n{listing}"
    )
}

/// Reorder by the service's ranking, skipping bad and repeated indices.
pub fn apply_rankings(articles: Vec<Article>, rankings: &[Ranking], limit: usize) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut slots: Vec<Option<Article>> = articles.into_iter().map(Some).collect();

    rankings
        .iter()
        .filter(|r| seen.insert(r.index))
        .filter_map(|r| slots.get_mut(r.index).and_then(Option::take))
        .take(limit)
        .collect()
}

fn truncated(mut articles: Vec<Article>, limit: usize) -> Vec<Article> {
    articles.truncate(limit);
    articles
}
