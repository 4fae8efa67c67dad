//! Authentication extractors.
//!
//! Handlers state which principal they need by taking `RequireUser` or
//! `RequireMerchant`; the session is consulted here and nowhere else, so
//! authentication state flows into handlers as an argument rather than
//! being looked up ad hoc.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use saverspot_core::PrincipalKind;

use crate::models::session::{CurrentMerchant, CurrentUser, SessionPrincipal, keys};

/// Extractor that requires a signed-in shopper.
///
/// A merchant session does not satisfy it: the principal kinds are mutually
/// exclusive and checked, not just present.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a signed-in merchant.
pub struct RequireMerchant(pub CurrentMerchant);

/// Error returned when a required principal is missing or the wrong kind.
pub enum AuthRejection {
    /// Redirect to a login page (for HTML requests).
    RedirectToLogin(&'static str),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(path) => Redirect::to(path).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Build the rejection for a missing principal of `kind` on this request.
fn reject(parts: &Parts, kind: PrincipalKind) -> AuthRejection {
    if parts.uri.path().starts_with("/api/") {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToLogin(kind.login_path())
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user = current_principal(session)
            .await
            .and_then(|principal| principal.as_user())
            .ok_or_else(|| reject(parts, PrincipalKind::User))?;

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for RequireMerchant
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let merchant = current_principal(session)
            .await
            .and_then(|principal| principal.as_merchant())
            .ok_or_else(|| reject(parts, PrincipalKind::Merchant))?;

        Ok(Self(merchant))
    }
}

/// Extractor that optionally gets the signed-in principal.
///
/// Unlike the require extractors, this never rejects; public pages use it to
/// adapt to whoever is browsing.
pub struct OptionalPrincipal(pub Option<SessionPrincipal>);

impl<S> FromRequestParts<S> for OptionalPrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = match parts.extensions.get::<Session>() {
            Some(session) => current_principal(session).await,
            None => None,
        };

        Ok(Self(principal))
    }
}

/// Store the signed-in principal in the session.
///
/// Overwrites any existing principal, so signing in as one kind replaces a
/// session of the other kind.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_principal(
    session: &Session,
    principal: &SessionPrincipal,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::PRINCIPAL, principal).await
}

/// Read the signed-in principal, if any.
pub async fn current_principal(session: &Session) -> Option<SessionPrincipal> {
    session
        .get::<SessionPrincipal>(keys::PRINCIPAL)
        .await
        .ok()
        .flatten()
}
