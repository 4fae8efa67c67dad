//! HTTP middleware stack for the web server.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, signed cookie)
//! 5. Route guard (cookie gate in front of /user and /merchant trees)
//! 6. Rate limiting (governor, on auth and API route families)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod route_guard;
pub mod session;

pub use auth::{
    OptionalPrincipal, RequireMerchant, RequireUser, current_principal, set_principal,
};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use route_guard::{RouteClass, route_guard_middleware};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
