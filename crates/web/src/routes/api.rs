//! Legacy JSON auth API.
//!
//! Stateless sibling of the browser flows, kept for clients built against
//! the original endpoints: one action-dispatch endpoint per principal kind.
//! Responses use a `{ success, ... }` envelope, and nothing here reads or
//! writes the session.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use saverspot_core::{Email, MerchantId, UserId};

use crate::services::AuthService;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Shopper auth request: `action` picks login or register.
#[derive(Debug, Deserialize)]
pub struct UserAuthRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    pub action: String,
}

/// Merchant auth request: `action` picks login or register.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantAuthRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    pub action: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Shopper summary returned on success.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// Merchant summary returned on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantSummary {
    pub id: MerchantId,
    pub business_name: String,
    pub email: Email,
}

#[derive(Debug, Serialize)]
struct UserAuthSuccess {
    success: bool,
    user: UserSummary,
}

#[derive(Debug, Serialize)]
struct MerchantAuthSuccess {
    success: bool,
    merchant: MerchantSummary,
}

#[derive(Debug, Serialize)]
struct AuthFailure {
    success: bool,
    message: String,
}

/// Build a failure envelope with the given status.
fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(AuthFailure {
            success: false,
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Map errors that are not part of the envelope contract.
///
/// Login rejections of every credential-shaped kind answer 401
/// "Invalid credentials"; anything else is a store problem.
fn login_failure(err: &AuthError) -> Response {
    match err {
        AuthError::InvalidEmail(_) | AuthError::InvalidCredentials | AuthError::AccountNotFound => {
            failure(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        _ => {
            tracing::warn!("API login failed: {}", err);
            failure(StatusCode::BAD_GATEWAY, "Credential store error")
        }
    }
}

/// Map register errors: validation messages pass through verbatim with a
/// 400, which is how a duplicate email surfaces its "already in use" text.
fn register_failure(err: AuthError) -> Response {
    match err {
        AuthError::Validation { message, .. } => failure(StatusCode::BAD_REQUEST, &message),
        AuthError::InvalidEmail(_) => failure(StatusCode::BAD_REQUEST, "Invalid email address"),
        other => {
            tracing::warn!("API register failed: {}", other);
            failure(StatusCode::BAD_GATEWAY, "Credential store error")
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Shopper action-dispatch endpoint.
pub async fn user_auth(
    State(state): State<AppState>,
    Json(body): Json<UserAuthRequest>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());

    match body.action.as_str() {
        "login" => match auth.sign_in(&body.email, &body.password).await {
            Ok((user, _token)) => Json(UserAuthSuccess {
                success: true,
                user: UserSummary {
                    id: user.id,
                    name: user.username,
                    email: user.email,
                },
            })
            .into_response(),
            Err(e) => login_failure(&e),
        },
        "register" => {
            let name = body.name.unwrap_or_default();
            match auth.sign_up(&body.email, &body.password, &name).await {
                Ok(user) => Json(UserAuthSuccess {
                    success: true,
                    user: UserSummary {
                        id: user.id,
                        name: user.username,
                        email: user.email,
                    },
                })
                .into_response(),
                Err(e) => register_failure(e),
            }
        }
        _ => failure(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

/// Merchant action-dispatch endpoint.
///
/// Register derives the account username from the business name the same
/// way the browser flow does: whitespace stripped.
pub async fn merchant_auth(
    State(state): State<AppState>,
    Json(body): Json<MerchantAuthRequest>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());

    match body.action.as_str() {
        "login" => match auth.sign_in_merchant(&body.email, &body.password).await {
            Ok((merchant, _token)) => Json(MerchantAuthSuccess {
                success: true,
                merchant: MerchantSummary {
                    id: merchant.id,
                    business_name: merchant.business_name,
                    email: merchant.email,
                },
            })
            .into_response(),
            Err(e) => login_failure(&e),
        },
        "register" => {
            let business_name = body.business_name.unwrap_or_default();
            let username: String = business_name.split_whitespace().collect();

            match auth
                .sign_up_merchant(
                    &body.email,
                    &body.password,
                    &username,
                    &business_name,
                    &body.contact_name.unwrap_or_default(),
                    &body.business_type.unwrap_or_default(),
                )
                .await
            {
                Ok(merchant) => Json(MerchantAuthSuccess {
                    success: true,
                    merchant: MerchantSummary {
                        id: merchant.id,
                        business_name: merchant.business_name,
                        email: merchant.email,
                    },
                })
                .into_response(),
                Err(e) => register_failure(e),
            }
        }
        _ => failure(StatusCode::BAD_REQUEST, "Invalid action"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_request_uses_wire_names() {
        let body = r#"{
            "email": "owner@shop.test",
            "password": "secret123",
            "businessName": "Corner Shop",
            "contactName": "Sam",
            "businessType": "retail",
            "action": "register"
        }"#;
        let parsed: MerchantAuthRequest = serde_json::from_str(body).expect("deserialize");
        assert_eq!(parsed.business_name.as_deref(), Some("Corner Shop"));
        assert_eq!(parsed.contact_name.as_deref(), Some("Sam"));
        assert_eq!(parsed.business_type.as_deref(), Some("retail"));
    }

    #[test]
    fn test_register_fields_are_optional() {
        let body = r#"{"email": "a@b.com", "password": "secret123", "action": "register"}"#;
        let parsed: UserAuthRequest = serde_json::from_str(body).expect("deserialize");
        assert!(parsed.name.is_none());

        let body = r#"{"email": "a@b.com", "password": "secret123", "action": "register"}"#;
        let parsed: MerchantAuthRequest = serde_json::from_str(body).expect("deserialize");
        assert!(parsed.business_name.is_none());
    }

    #[test]
    fn test_merchant_summary_wire_names() {
        let summary = MerchantSummary {
            id: MerchantId::new("m1"),
            business_name: "Corner Shop".to_string(),
            email: Email::parse("owner@shop.test").expect("email"),
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["businessName"], "Corner Shop");
    }
}
