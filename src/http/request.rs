//! Request inspection and request IDs.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every request
//! - Extract the routing-relevant host and URI from a request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Ports are stripped from host values; configured hostnames carry none

use axum::http::{header, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID set by the request-id layer, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Host header value(s) without ports; falls back to the URI authority
/// (HTTP/2 requests carry no Host header).
pub fn request_host<B>(request: &Request<B>) -> String {
    let raw = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default();

    raw.split(',')
        .map(|host| strip_port(host.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Path and query of the request, `/` when absent.
pub fn request_target<B>(request: &Request<B>) -> String {
    request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: keep up to the closing bracket
        return host.find(']').map_or(host, |end| &host[..=end]);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(host: Option<&str>, uri: &str) -> Request<()> {
        let mut builder = Request::builder().uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_request_host() {
        assert_eq!(request_host(&request(Some("example.com:8080"), "/")), "example.com");
        assert_eq!(request_host(&request(Some("[::1]:8080"), "/")), "[::1]");
        assert_eq!(
            request_host(&request(Some("internal:80, example.com"), "/")),
            "internal, example.com"
        );
        assert_eq!(request_host(&request(None, "http://h2.example.com/x")), "h2.example.com");
        assert_eq!(request_host(&request(None, "/x")), "");
    }

    #[test]
    fn test_request_target() {
        assert_eq!(request_target(&request(None, "/shop/cart?x=1")), "/shop/cart?x=1");
    }

    #[test]
    fn test_request_id_generation() {
        let id = UuidRequestId.make_request_id(&request(None, "/")).unwrap();
        assert_eq!(id.header_value().len(), 36);
    }
}
