//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Two limiters for two endpoint categories:
//! - `auth_rate_limiter`: strict, for sign-in/signup endpoints (~10/min)
//! - `api_rate_limiter`: relaxed, for the JSON API (~100/min)

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that reads the client IP from reverse-proxy headers.
///
/// Checks `X-Forwarded-For` (first hop) then `X-Real-IP`. Without either
/// header, all requests share the loopback key: local runs are not behind a
/// proxy, and a shared bucket there is fine.
#[derive(Clone, Copy)]
pub struct ProxyIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ProxyIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For: first IP in the chain is the client
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ProxyIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5. Slows
/// credential guessing on the sign-in and signup endpoints.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5) // Allow burst of 5 requests
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for the JSON API: ~100 requests per minute per IP.
///
/// Configuration: 1 request per second (replenish), burst of 50.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(50)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ProxyIpKeyExtractor)
        .per_second(1) // Replenish quickly
        .burst_size(50) // Allow burst of 50 requests
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request_with_header(name: &str, value: &str) -> Request<()> {
        Request::builder()
            .header(name, value)
            .body(())
            .expect("request")
    }

    #[test]
    fn test_extractor_prefers_forwarded_for() {
        let request = request_with_header("x-forwarded-for", "203.0.113.7, 10.0.0.1");
        let key = ProxyIpKeyExtractor.extract(&request).expect("key");
        assert_eq!(key.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_extractor_falls_back_to_real_ip() {
        let request = request_with_header("x-real-ip", "198.51.100.4");
        let key = ProxyIpKeyExtractor.extract(&request).expect("key");
        assert_eq!(key.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_extractor_defaults_to_loopback() {
        let request = Request::builder().body(()).expect("request");
        let key = ProxyIpKeyExtractor.extract(&request).expect("key");
        assert_eq!(key, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }
}
