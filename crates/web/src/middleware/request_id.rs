//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an id: the upstream proxy's `x-request-id` when one is
//! set, otherwise a fresh UUID v4. The id is recorded in the current tracing
//! span, tagged onto the Sentry scope, and echoed in the response headers.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Read a usable request id off the incoming headers.
///
/// Empty and non-UTF-8 values are treated as absent rather than propagated.
fn incoming_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty())
        .map(String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        incoming_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    // Record in the request span for structured logging
    Span::current().record("request_id", &request_id);

    // Set in Sentry scope for error correlation
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    // Echo in the response so clients can reference the id in reports
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_id_present() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(incoming_id(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_incoming_id_absent() {
        assert!(incoming_id(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_incoming_id_empty_value_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        assert!(incoming_id(&headers).is_none());
    }

    #[test]
    fn test_incoming_id_non_utf8_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_bytes(&[0xff, 0xfe]).expect("header value"),
        );
        assert!(incoming_id(&headers).is_none());
    }
}
