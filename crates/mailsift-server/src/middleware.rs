//! Middleware for the REST API server.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Create CORS middleware.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Request logging middleware.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    response
}

/// Whether an `Authorization` header value carries the expected API key.
///
/// Accepts `Bearer <key>` or `Token <key>`. An empty expected key matches nothing.
pub fn api_key_matches(header: Option<&str>, expected_key: &str) -> bool {
    if expected_key.is_empty() {
        return false;
    }
    header
        .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("Token ")))
        .is_some_and(|token| token == expected_key)
}

/// API key authentication middleware.
///
/// Active when `MAILSIFT_REQUIRE_AUTH` is set; the key comes from
/// `MAILSIFT_API_KEY`. With no key configured every request is rejected.
pub async fn auth_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    if std::env::var("MAILSIFT_REQUIRE_AUTH").is_ok() {
        let expected_key = std::env::var("MAILSIFT_API_KEY").unwrap_or_default();
        let header = request
            .headers()
            .get("Authorization")
            .and_then(|v| v.to_str().ok());

        if !api_key_matches(header, &expected_key) {
            if expected_key.is_empty() {
                warn!(uri = %request.uri(), "Rejected request: MAILSIFT_API_KEY is not set");
            } else {
                warn!(uri = %request.uri(), "Rejected request without valid API key");
            }
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_schemes() {
        assert!(api_key_matches(Some("Bearer s3cret"), "s3cret"));
        assert!(api_key_matches(Some("Token s3cret"), "s3cret"));
        assert!(!api_key_matches(Some("Basic s3cret"), "s3cret"));
        assert!(!api_key_matches(Some("Bearer wrong"), "s3cret"));
        assert!(!api_key_matches(None, "s3cret"));
    }

    #[test]
    fn test_empty_key_rejects_everything() {
        assert!(!api_key_matches(None, ""));
        assert!(!api_key_matches(Some("Bearer "), ""));
        assert!(!api_key_matches(Some("Token "), ""));
        assert!(!api_key_matches(Some("Bearer anything"), ""));
    }
}
