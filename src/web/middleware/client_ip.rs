//! Client address resolution behind reverse proxies.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Resolve the caller's address.
///
/// Order: first `X-Forwarded-For` entry, `X-Real-IP`, the socket peer,
/// then `"unknown"`.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(ip) = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    if let Some(ip) = headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.1.2.3:4567".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_first_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("X-Real-IP", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(client_ip(&headers, peer()), "203.0.113.7");
    }

    #[test]
    fn test_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Real-IP", HeaderValue::from_static("198.51.100.1"));
        assert_eq!(client_ip(&headers, peer()), "198.51.100.1");
    }

    #[test]
    fn test_peer_then_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_ip(&headers, peer()), "10.1.2.3");
        assert_eq!(client_ip(&headers, None), "unknown");
    }
}
