//! Web API News Tests
//!
//! Integration tests for the news and feed endpoints.

mod common;

use std::sync::Arc;

use axum_test::TestServer;
use common::{aggregator, mount_feed, mount_ranking, test_config};
use newsdesk::config::Config;
use newsdesk::news::NewsAggregator;
use newsdesk::web::router::{create_health_router, create_router};
use newsdesk::web::AppState;
use newsdesk::Identity;
use serde_json::Value;
use wiremock::MockServer;

/// Create a test server over the given configuration.
fn create_test_server(config: Config) -> (TestServer, Arc<NewsAggregator>) {
    let salt = config.identity.salt.clone();
    let aggregator = Arc::new(aggregator(config));
    let state = Arc::new(AppState::new(aggregator.clone(), salt));

    let router = create_router(state, &[]).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, aggregator)
}

#[tokio::test]
async fn test_news_defaults() {
    let mock = MockServer::start().await;
    mount_feed(&mock, "/feeds/all.xml", 8, 1).await;
    let (server, _) = create_test_server(test_config(&mock));

    let response = server.get("/api/news").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data[0]["title"], "Story 1");
    assert_eq!(data[0]["link"], "https://news.example.com/story-1");
    assert_eq!(data[0]["description"], "Body of story 1");
    assert_eq!(data[0]["pubDate"], "2025-06-03 01:30:00");
    assert!(data[0]["image"].is_null());
}

#[tokio::test]
async fn test_news_with_count_and_category() {
    let mock = MockServer::start().await;
    mount_feed(&mock, "/feeds/tech.xml", 8, 1).await;
    let (server, _) = create_test_server(test_config(&mock));

    let response = server
        .get("/api/news")
        .add_query_param("count", "2")
        .add_query_param("category", "tech")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_news_bad_count() {
    let mock = MockServer::start().await;
    mount_feed(&mock, "/feeds/all.xml", 8, 0).await;
    let (server, _) = create_test_server(test_config(&mock));

    let response = server
        .get("/api/news")
        .add_query_param("count", "lots")
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("count"));
}

#[tokio::test]
async fn test_news_bad_use_ai_flag() {
    let mock = MockServer::start().await;
    let (server, _) = create_test_server(test_config(&mock));

    let response = server
        .get("/api/news")
        .add_query_param("useAI", "perhaps")
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_news_ranking_charges_forwarded_client() {
    let mock = MockServer::start().await;
    mount_feed(&mock, "/feeds/all.xml", 6, 1).await;
    mount_ranking(&mock, r#"[{"index": 2, "score": 9}]"#, 1).await;
    let (server, aggregator) = create_test_server(test_config(&mock));

    let response = server
        .get("/api/news")
        .add_query_param("count", "2")
        .add_query_param("useAI", "1")
        .add_query_param("criteria", "elections")
        .add_header("X-Forwarded-For", "203.0.113.50, 10.0.0.2")
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["data"][0]["title"], "Story 3");

    let identity = Identity::guest("203.0.113.50", "test-salt");
    let counter = aggregator
        .filter()
        .quota()
        .counter(&identity)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(counter.count, 1);
}

#[tokio::test]
async fn test_list_feeds() {
    let mock = MockServer::start().await;
    let (server, _) = create_test_server(test_config(&mock));

    let response = server.get("/api/feeds").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(
        body["data"],
        serde_json::json!([
            {"value": "all", "label": "All News"},
            {"value": "tech", "label": "Technology"}
        ])
    );
}

#[tokio::test]
async fn test_list_feeds_defaults_when_unconfigured() {
    let (server, _) = create_test_server(Config::default());

    let response = server.get("/api/feeds").await;
    let body: Value = response.json();
    let values: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["value"].as_str().unwrap())
        .collect();

    assert_eq!(values, ["all", "world", "business", "sport", "culture"]);
}

#[tokio::test]
async fn test_health() {
    let (server, _) = create_test_server(Config::default());

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}
