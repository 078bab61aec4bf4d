//! HTTP API for the news pipeline.
//!
//! Exposes the news read endpoint, the feed option list used to populate
//! category pickers, and a health check.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;
