//! Middleware and request helpers for the HTTP API.

pub mod client_ip;
pub mod cors;

pub use client_ip::client_ip;
pub use cors::create_cors_layer;
