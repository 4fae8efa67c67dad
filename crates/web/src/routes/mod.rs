//! HTTP route handlers for the `SaverSpot` web server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Landing page (redirects signed-in principals)
//! GET  /health                   - Liveness check
//! GET  /ready                    - Readiness check (probes the credential store)
//!
//! # Shopper
//! GET  /user/signup              - Signup page
//! POST /user/signup              - Signup action
//! GET  /user/login               - Sign-in page
//! POST /user/login               - Sign-in action
//! POST /user/logout              - Sign-out action
//! GET  /user/offers              - Offer catalog (public; recommendations when pod data is ready)
//! POST /user/pod/login           - Start the pod login flow (requires auth)
//! GET  /user/callback            - Pod issuer authorization callback
//! GET  /user/profile             - Profile page (requires auth)
//! POST /user/profile             - Profile update action (requires auth)
//! GET  /user/dashboard           - Savings dashboard (requires auth)
//!
//! # Merchant
//! GET  /merchant/signup          - Signup page
//! POST /merchant/signup          - Signup action
//! GET  /merchant/login           - Sign-in page
//! POST /merchant/login           - Sign-in action
//! POST /merchant/logout          - Sign-out action
//! GET  /merchant/dashboard       - Offers, orders, and categories (requires auth)
//! POST /merchant/offers          - Create an offer (requires auth)
//! POST /merchant/offers/{id}     - Update an offer (requires auth)
//! DELETE /merchant/offers/{id}   - Delete an offer (requires auth)
//!
//! # Legacy JSON API (stateless)
//! POST /api/user/auth            - Action-dispatch login/register for shoppers
//! POST /api/merchant/auth        - Action-dispatch login/register for merchants
//! ```
//!
//! Browser flows report failures as `?error=code` query parameters on a
//! redirect, never as error status pages; the JSON API uses a
//! `{ success, ... }` envelope.

pub mod api;
pub mod home;
pub mod merchant;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Create the shopper routes router.
///
/// The credential endpoints carry the strict rate limiter; the rest of the
/// family is unmetered.
pub fn user_routes() -> Router<AppState> {
    let credential = Router::new()
        .route("/signup", get(user::signup_page).post(user::signup))
        .route("/login", get(user::login_page).post(user::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(user::logout))
        .route("/offers", get(user::offers))
        .route("/pod/login", post(user::pod_login))
        .route("/callback", get(user::callback))
        .route("/profile", get(user::profile_page).post(user::update_profile))
        .route("/dashboard", get(user::dashboard))
        .merge(credential)
}

/// Create the merchant routes router.
pub fn merchant_routes() -> Router<AppState> {
    use axum::routing::delete;

    let credential = Router::new()
        .route("/signup", get(merchant::signup_page).post(merchant::signup))
        .route("/login", get(merchant::login_page).post(merchant::login))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/logout", post(merchant::logout))
        .route("/dashboard", get(merchant::dashboard))
        .route("/offers", post(merchant::create_offer))
        .route(
            "/offers/{id}",
            post(merchant::update_offer).delete(merchant::delete_offer),
        )
        .merge(credential)
}

/// Create the legacy JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/user/auth", post(api::user_auth))
        .route("/merchant/auth", post(api::merchant_auth))
        .layer(api_rate_limiter())
}

/// Create all routes for the web server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Landing page
        .route("/", get(home::home))
        // Shopper routes
        .nest("/user", user_routes())
        // Merchant routes
        .nest("/merchant", merchant_routes())
        // Legacy JSON API
        .nest("/api", api_routes())
}

/// Map an auth failure to the `?error=` code carried on a redirect.
///
/// Validation failures name the rejected field so the page can highlight it;
/// everything credential-shaped collapses into one code to avoid leaking
/// which half was wrong.
pub(crate) fn auth_error_code(err: &AuthError) -> &'static str {
    use crate::pocketbase::ValidationField;

    match err {
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::InvalidCredentials | AuthError::AccountNotFound => "credentials",
        AuthError::Validation { field, .. } => match field {
            ValidationField::Email => "email",
            ValidationField::Username => "username",
            ValidationField::Password => "password",
            ValidationField::ContactName => "contact_name",
            ValidationField::BusinessName => "business_name",
            ValidationField::BusinessType => "business_type",
            ValidationField::PodIssuer => "pod_issuer",
        },
        AuthError::Store(_) => "failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pocketbase::ValidationField;

    #[test]
    fn test_auth_error_code_hides_credential_detail() {
        assert_eq!(auth_error_code(&AuthError::InvalidCredentials), "credentials");
        assert_eq!(auth_error_code(&AuthError::AccountNotFound), "credentials");
    }

    #[test]
    fn test_auth_error_code_names_rejected_field() {
        let err = AuthError::Validation {
            field: ValidationField::BusinessName,
            message: "Missing required value.".to_string(),
        };
        assert_eq!(auth_error_code(&err), "business_name");
    }
}
