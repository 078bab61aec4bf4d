//! Feed acquisition and article assembly.
//!
//! This module provides:
//! - The feed registry mapping categories to feed URLs
//! - Feed fetching and parsing for RSS 2.0 and Atom
//! - Normalization of raw items into articles
//! - The demo corpus served when a feed is unavailable
//! - The aggregator tying these to ranking and caching

pub mod aggregator;
pub mod demo;
pub mod fetcher;
pub mod html;
pub mod normalizer;
pub mod registry;
pub mod types;

pub use aggregator::{NewsAggregator, NewsRequest};
pub use demo::{demo_articles, DEMO_CORPUS_SIZE};
pub use fetcher::{parse_feed, FeedFetcher};
pub use normalizer::{normalize, resolve_image};
pub use registry::{default_feeds, sanitize_descriptors, FeedRegistry, ResolvedFeed};
pub use types::{
    Article, Enclosure, FeedDescriptor, FeedOption, MediaContent, ParsedFeed, RawItem,
    DEFAULT_CATEGORY, DEFAULT_COUNT, MAX_COUNT,
};
