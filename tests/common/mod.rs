//! Test helpers for pipeline and API tests.
//!
//! Provides RSS fixtures, mock ranking replies and a configuration that
//! points the pipeline at a wiremock server.

#![allow(dead_code)]

use std::sync::Arc;

use newsdesk::cache::{KvStore, MemoryStore};
use newsdesk::config::Config;
use newsdesk::news::{FeedDescriptor, NewsAggregator};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key the mock ranking endpoint expects.
pub const TEST_API_KEY: &str = "test-key";

/// Path of the mock chat completions endpoint.
pub const RANKING_PATH: &str = "/v1/chat/completions";

/// Build an RSS 2.0 document with `n` items titled "Story 1".."Story n".
pub fn rss_fixture(n: usize) -> String {
    let items: String = (1..=n)
        .map(|i| {
            format!(
                "<item>\
                   <title>Story {i}</title>\
                   <link>https://news.example.com/story-{i}</link>\
                   <description>&lt;p&gt;Body of story {i}&lt;/p&gt;</description>\
                   <pubDate>Tue, 03 Jun 2025 0{h}:30:00 GMT</pubDate>\
                 </item>",
                h = i % 10
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel>\
           <title>Fixture News</title>\
           <link>https://news.example.com/</link>\
           <description>Fixture</description>\
           {items}\
         </channel></rss>"
    )
}

/// A 200 response carrying an RSS document.
pub fn rss_response(n: usize) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/rss+xml")
        .set_body_string(rss_fixture(n))
}

/// A chat completions reply whose message content is `content`.
pub fn ranking_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

/// Mount a feed at `route` serving `n` items.
pub async fn mount_feed(server: &MockServer, route: &str, n: usize, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(rss_response(n))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mount the ranking endpoint replying with `content`.
pub async fn mount_ranking(server: &MockServer, content: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(RANKING_PATH))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .respond_with(ranking_response(content))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Configuration with two feeds served by `server` and ranking enabled.
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.fetch.allow_private_hosts = true;
    config.fetch.total_timeout_secs = 5;
    config.ranking.api_key = Some(TEST_API_KEY.to_string());
    config.ranking.endpoint = format!("{}{}", server.uri(), RANKING_PATH);
    config.ranking.timeout_secs = 5;
    config.identity.salt = "test-salt".to_string();
    config.feeds = vec![
        FeedDescriptor::new("all", "All News", format!("{}/feeds/all.xml", server.uri())),
        FeedDescriptor::new("tech", "Technology", format!("{}/feeds/tech.xml", server.uri())),
    ];
    config
}

/// Build an aggregator over `config` with the given durable store.
pub fn aggregator_with(config: Config, durable: Arc<dyn KvStore>) -> NewsAggregator {
    NewsAggregator::from_config(Arc::new(config), durable).expect("Failed to build aggregator")
}

/// Build an aggregator with an in-memory durable store.
pub fn aggregator(config: Config) -> NewsAggregator {
    aggregator_with(config, Arc::new(MemoryStore::default()))
}

/// Titles of the given articles.
pub fn titles(articles: &[newsdesk::Article]) -> Vec<String> {
    articles.iter().map(|a| a.title.clone()).collect()
}
