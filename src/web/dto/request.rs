//! Request DTOs for the HTTP API.

use serde::Deserialize;

use crate::news::{NewsRequest, DEFAULT_CATEGORY, DEFAULT_COUNT};
use crate::{NewsError, Result};

/// Query string of `GET /api/news`.
///
/// Fields arrive as raw strings so malformed values can be reported as
/// validation errors instead of a generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct NewsQuery {
    /// Number of articles, default 5.
    #[serde(default)]
    pub count: Option<String>,
    /// Category id, default "all".
    #[serde(default)]
    pub category: Option<String>,
    /// Whether to rank by relevance.
    #[serde(default, rename = "useAI")]
    pub use_ai: Option<String>,
    /// Ranking criteria.
    #[serde(default)]
    pub criteria: Option<String>,
}

impl NewsQuery {
    /// Validate the query and build a news request.
    pub fn into_request(self) -> Result<NewsRequest> {
        let count = match self.count.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_COUNT,
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                NewsError::Validation(format!("count must be a positive integer, got '{raw}'"))
            })?,
        };

        let use_ai = match self.use_ai.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                NewsError::Validation(format!("useAI must be true or false, got '{raw}'"))
            })?,
        };

        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Ok(NewsRequest::new(count, category).with_ai(use_ai, self.criteria.unwrap_or_default()))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
