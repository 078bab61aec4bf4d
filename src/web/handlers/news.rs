//! News handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    Json,
};

use crate::identity::Identity;
use crate::news::{Article, FeedOption};
use crate::web::dto::{ApiResponse, NewsQuery};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::client_ip;

/// GET /api/news - Fetch normalized articles for a category.
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Query(query): Query<NewsQuery>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let request = query.into_request()?;

    let ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let identity = Identity::guest(&ip, &state.identity_salt);

    let articles = state.aggregator.fetch_news(&request, &identity).await;
    Ok(Json(ApiResponse::new(articles)))
}

/// GET /api/feeds - List enabled feeds as picker options.
pub async fn list_feeds(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<FeedOption>>> {
    Json(ApiResponse::new(state.aggregator.registry().options()))
}
