//! API handlers.

pub mod news;

pub use news::{get_news, list_feeds};

use std::sync::Arc;

use crate::news::NewsAggregator;

/// Shared application state.
pub struct AppState {
    /// The news pipeline.
    pub aggregator: Arc<NewsAggregator>,
    /// Salt for hashed guest addresses.
    pub identity_salt: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(aggregator: Arc<NewsAggregator>, identity_salt: impl Into<String>) -> Self {
        Self {
            aggregator,
            identity_salt: identity_salt.into(),
        }
    }
}
