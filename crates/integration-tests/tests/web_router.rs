//! In-process router tests.
//!
//! These drive the real router through `tower::ServiceExt::oneshot` with no
//! credential store behind it, covering the request surface that never needs
//! one: the route guard, session-backed redirects, and the legacy API's
//! action dispatch. `POCKETBASE_URL` points at a closed port, so record
//! calls fail fast and exercise the degraded paths instead of hanging.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use saverspot_web::config::AppConfig;
use saverspot_web::middleware::{create_session_layer, route_guard_middleware};
use saverspot_web::routes;
use saverspot_web::state::AppState;

// ============================================================================
// Harness
// ============================================================================

/// Configuration pointing at nothing: no store listens on port 9, so record
/// calls fail with a connection error instead of hanging.
fn test_config() -> AppConfig {
    AppConfig {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://127.0.0.1:3000".to_string(),
        session_secret: SecretString::from("k9PqW3vN8xR2mT5bY7cJ4hF6dS1gA0zL9nE8uI3oQ6wV"),
        pocketbase_url: "http://127.0.0.1:9".to_string(),
        pod_issuer: "https://server1.sgpod.co".to_string(),
        claude: None,
        sentry_dsn: None,
    }
}

/// Assemble the router the way the server does, minus observability layers.
fn test_app() -> Router {
    let state = AppState::new(test_config());
    let session_layer = create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(route_guard_middleware))
        .layer(session_layer)
        .with_state(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

// ============================================================================
// Route Guard
// ============================================================================

#[tokio::test]
async fn test_public_pages_need_no_cookie() {
    let app = test_app();

    let response = app.clone().oneshot(get("/user/login")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/merchant/signup")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_page_without_cookie_redirects_home() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(get("/user/profile"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    let response = app
        .oneshot(get("/merchant/dashboard"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_forged_cookie_passes_guard_but_not_auth() {
    let app = test_app();

    // The guard only checks that the cookie is named; the session layer then
    // rejects the forged value, so the auth extractor bounces to the login
    // page instead of the guard's home redirect.
    let request = Request::builder()
        .uri("/user/profile")
        .header(header::COOKIE, "pb_auth=sometoken")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/user/login"));
}

#[tokio::test]
async fn test_open_paths_skip_the_guard() {
    let app = test_app();

    let response = app.oneshot(get("/nonexistent")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_landing_page_for_anonymous() {
    let app = test_app();

    let response = app.oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["name"], "SaverSpot");
    assert_eq!(body["offers"], "/user/offers");
}

#[tokio::test]
async fn test_logout_redirects_home() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/user/logout")
        .header(header::COOKIE, "pb_auth=sometoken")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_merchant_logout_redirects_to_login() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/merchant/logout")
        .header(header::COOKIE, "pb_auth=sometoken")
        .body(Body::empty())
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/merchant/login"));
}

// ============================================================================
// Legacy API Dispatch
// ============================================================================

#[tokio::test]
async fn test_api_rejects_unknown_action() {
    let app = test_app();

    let response = app
        .oneshot(post_json(
            "/api/user/auth",
            r#"{"email": "a@b.com", "password": "secret123", "action": "destroy"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid action");
}

#[tokio::test]
async fn test_api_merchant_rejects_unknown_action() {
    let app = test_app();

    let response = app
        .oneshot(post_json(
            "/api/merchant/auth",
            r#"{"email": "a@b.com", "password": "secret123", "action": "refresh"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid action");
}

#[tokio::test]
async fn test_api_login_with_store_down_is_bad_gateway() {
    let app = test_app();

    let response = app
        .oneshot(post_json(
            "/api/user/auth",
            r#"{"email": "a@b.com", "password": "secret123", "action": "login"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Credential store error");
}

#[tokio::test]
async fn test_api_never_touches_the_session() {
    let app = test_app();

    let response = app
        .oneshot(post_json(
            "/api/user/auth",
            r#"{"email": "a@b.com", "password": "secret123", "action": "destroy"}"#,
        ))
        .await
        .expect("response");

    assert!(
        response.headers().get(header::SET_COOKIE).is_none(),
        "legacy API responses must not set cookies"
    );
}

// ============================================================================
// Browser Flows
// ============================================================================

#[tokio::test]
async fn test_login_post_with_store_down_redirects_with_error() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/user/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("email=a%40b.com&password=secret123"))
        .expect("request");

    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/user/login?error=failed"));
}
