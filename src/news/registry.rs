//! Category to feed URL resolution.

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::news::types::{FeedDescriptor, FeedOption};

/// Built-in feeds used when nothing usable is configured.
pub fn default_feeds() -> Vec<FeedDescriptor> {
    vec![
        FeedDescriptor::new("all", "All News", "http://feeds.bbci.co.uk/news/rss.xml"),
        FeedDescriptor::new("world", "World", "http://feeds.bbci.co.uk/news/world/rss.xml"),
        FeedDescriptor::new(
            "business",
            "Business",
            "http://feeds.bbci.co.uk/news/business/rss.xml",
        ),
        FeedDescriptor::new("sport", "Sport", "http://feeds.bbci.co.uk/news/sport/rss.xml"),
        FeedDescriptor::new(
            "culture",
            "Culture",
            "http://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml",
        ),
    ]
}

/// Clean up descriptors entered by an operator.
///
/// Entries without a url are dropped, ids are reduced to lowercase slugs
/// and blank labels fall back to the id. An empty result is replaced by
/// [`default_feeds`].
pub fn sanitize_descriptors(descriptors: Vec<FeedDescriptor>) -> Vec<FeedDescriptor> {
    let cleaned: Vec<FeedDescriptor> = descriptors
        .into_iter()
        .filter(|d| !d.url.trim().is_empty())
        .map(|d| {
            let id = slugify(&d.id);
            let label = match d.label.trim() {
                "" => id.clone(),
                label => label.to_string(),
            };
            FeedDescriptor {
                id,
                label,
                url: d.url.trim().to_string(),
                enabled: d.enabled,
            }
        })
        .collect();

    if cleaned.is_empty() {
        default_feeds()
    } else {
        cleaned
    }
}

/// Reduce a string to `[a-z0-9_-]`.
fn slugify(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// The feed chosen for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeed {
    /// Category id the URL belongs to.
    pub id: String,
    /// Feed URL.
    pub url: String,
}

/// Resolves category keys to feed URLs.
pub struct FeedRegistry {
    provider: Arc<dyn ConfigProvider>,
}

impl FeedRegistry {
    /// Create a registry reading from the given provider.
    pub fn new(provider: Arc<dyn ConfigProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a category to a feed.
    ///
    /// An unknown category resolves to the first usable feed. When no
    /// configured feed is usable the built-in defaults are consulted.
    pub fn resolve(&self, category: &str) -> ResolvedFeed {
        let feeds = self.usable_feeds();

        let chosen = feeds
            .iter()
            .find(|f| f.id == category)
            .or_else(|| feeds.first());

        match chosen {
            Some(feed) => ResolvedFeed {
                id: feed.id.clone(),
                url: feed.url.clone(),
            },
            // default_feeds() is never empty
            None => ResolvedFeed {
                id: "all".to_string(),
                url: "http://feeds.bbci.co.uk/news/rss.xml".to_string(),
            },
        }
    }

    /// Enabled categories as `{value, label}` pairs.
    pub fn options(&self) -> Vec<FeedOption> {
        self.usable_feeds()
            .into_iter()
            .map(|f| FeedOption {
                label: if f.label.is_empty() {
                    f.id.clone()
                } else {
                    f.label
                },
                value: f.id,
            })
            .collect()
    }

    /// Enabled feeds with both an id and a url, one per id.
    ///
    /// A repeated id keeps its first position but takes the later url.
    fn usable_feeds(&self) -> Vec<FeedDescriptor> {
        let mut feeds: Vec<FeedDescriptor> = Vec::new();

        for descriptor in self.provider.feed_descriptors() {
            if !descriptor.enabled || descriptor.id.is_empty() || descriptor.url.is_empty() {
                continue;
            }
            match feeds.iter_mut().find(|f| f.id == descriptor.id) {
                Some(existing) => existing.url = descriptor.url,
                None => feeds.push(descriptor),
            }
        }

        if feeds.is_empty() {
            tracing::debug!("No enabled feeds configured, using built-in defaults");
            default_feeds()
        } else {
            feeds
        }
    }
}
