//! Cookie gate in front of the /user and /merchant page trees.
//!
//! First line of defense, carried over from the first-generation frontend's
//! edge middleware: it checks only that the session cookie is *present* and
//! bounces anonymous browsers to the home page. It never validates the
//! session; handlers behind it still authenticate via the extractors in
//! [`super::auth`], which also catch a present-but-bogus cookie.

use axum::{
    extract::Request,
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::SESSION_COOKIE_NAME;

/// Paths under the guarded trees that stay public.
const PUBLIC_PATHS: &[&str] = &[
    "/user/signup",
    "/user/login",
    "/user/callback",
    "/user/offers",
    "/merchant/signup",
    "/merchant/login",
];

/// How the guard treats a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Not under a guarded tree; pass through.
    Open,
    /// Under a guarded tree but explicitly public; pass through.
    Public,
    /// Under a guarded tree and protected; needs the session cookie.
    Protected,
}

impl RouteClass {
    /// Classify a request path.
    #[must_use]
    pub fn classify(path: &str) -> Self {
        if PUBLIC_PATHS.contains(&path) {
            return Self::Public;
        }
        if path == "/user"
            || path == "/merchant"
            || path.starts_with("/user/")
            || path.starts_with("/merchant/")
        {
            return Self::Protected;
        }
        Self::Open
    }
}

/// Redirect cookie-less requests for protected pages to the home page.
pub async fn route_guard_middleware(request: Request, next: Next) -> Response {
    match RouteClass::classify(request.uri().path()) {
        RouteClass::Open | RouteClass::Public => next.run(request).await,
        RouteClass::Protected => {
            if has_session_cookie(request.headers()) {
                next.run(request).await
            } else {
                tracing::debug!(
                    path = %request.uri().path(),
                    "redirecting cookie-less request to home"
                );
                Redirect::to("/").into_response()
            }
        }
    }
}

/// Whether the raw Cookie header names the session cookie.
///
/// Presence is enough; the value is not inspected here.
fn has_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| {
            cookies.split(';').any(|cookie| {
                cookie
                    .trim_start()
                    .strip_prefix(SESSION_COOKIE_NAME)
                    .is_some_and(|rest| rest.starts_with('='))
            })
        })
}
