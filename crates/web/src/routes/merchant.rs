//! Merchant route handlers.
//!
//! Signup, sign-in, and the dashboard a merchant manages offers from.
//! The store enforces record access through the token the merchant signed
//! in with, so offer mutations ride on that token rather than a re-check
//! here.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use saverspot_core::{CategoryId, OfferId, OfferStatus};

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalPrincipal, RequireMerchant, set_principal};
use crate::models::offer::{Category, NewOffer, Offer, OfferUpdate, Order};
use crate::models::session::SessionPrincipal;
use crate::services::AuthService;
use crate::state::AppState;

use super::auth_error_code;

// =============================================================================
// Form Types
// =============================================================================

/// Merchant signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub business_name: String,
    pub contact_name: String,
    pub business_type: String,
    pub email: String,
    pub password: String,
}

/// Merchant sign-in form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// New offer form data.
#[derive(Debug, Deserialize)]
pub struct NewOfferForm {
    pub category_id: String,
    pub discount: f64,
    pub start_date: String,
    pub end_date: String,
}

/// Offer update form data; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct OfferUpdateForm {
    pub category_id: Option<String>,
    pub discount: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<OfferStatus>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Page Types
// =============================================================================

/// Merchant signup page body.
#[derive(Debug, Serialize)]
pub struct SignupPage {
    pub error: Option<String>,
}

/// Merchant sign-in page body.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Merchant dashboard body: the merchant's offers and orders, plus the
/// category directory the offer form picks from.
#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub business_name: String,
    pub offers: Vec<Offer>,
    pub orders: Vec<Order>,
    pub categories: Vec<Category>,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the merchant signup page.
pub async fn signup_page(
    OptionalPrincipal(principal): OptionalPrincipal,
    Query(query): Query<MessageQuery>,
) -> Response {
    if principal.is_some_and(|p| p.as_merchant().is_some()) {
        return Redirect::to("/merchant/dashboard").into_response();
    }
    Json(SignupPage { error: query.error }).into_response()
}

/// Handle merchant signup form submission.
///
/// The account username is the business name with whitespace stripped, so
/// "Joe's Coffee" signs in under the record name "Joe'sCoffee".
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let auth = AuthService::new(state.pocketbase());
    let username: String = form.business_name.split_whitespace().collect();

    match auth
        .sign_up_merchant(
            &form.email,
            &form.password,
            &username,
            &form.business_name,
            &form.contact_name,
            &form.business_type,
        )
        .await
    {
        Ok(_) => Redirect::to("/merchant/login?success=account_created").into_response(),
        Err(e) => {
            tracing::warn!("Merchant signup failed: {}", e);
            Redirect::to(&format!("/merchant/signup?error={}", auth_error_code(&e)))
                .into_response()
        }
    }
}

// =============================================================================
// Sign-in Routes
// =============================================================================

/// Display the merchant sign-in page.
pub async fn login_page(
    OptionalPrincipal(principal): OptionalPrincipal,
    Query(query): Query<MessageQuery>,
) -> Response {
    if principal.is_some_and(|p| p.as_merchant().is_some()) {
        return Redirect::to("/merchant/dashboard").into_response();
    }
    Json(LoginPage {
        error: query.error,
        success: query.success,
    })
    .into_response()
}

/// Handle merchant sign-in form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());

    match auth.sign_in_merchant(&form.email, &form.password).await {
        Ok((merchant, token)) => {
            let principal = SessionPrincipal::for_merchant(&merchant, token);

            if let Err(e) = set_principal(&session, &principal).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/merchant/login?error=session").into_response();
            }

            set_sentry_user(&principal.id, Some(principal.email.as_str()));
            add_breadcrumb(
                "auth",
                "Merchant signed in",
                Some(&[("merchant_id", principal.id.as_str())]),
            );

            Redirect::to("/merchant/dashboard").into_response()
        }
        Err(e) => {
            tracing::warn!("Merchant sign-in failed: {}", e);
            Redirect::to(&format!("/merchant/login?error={}", auth_error_code(&e)))
                .into_response()
        }
    }
}

/// Handle merchant sign-out.
pub async fn logout(session: Session) -> Response {
    clear_sentry_user();

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/merchant/login").into_response()
}

// =============================================================================
// Dashboard Routes
// =============================================================================

/// Display the merchant dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireMerchant(merchant): RequireMerchant,
    Query(query): Query<MessageQuery>,
) -> Result<Json<DashboardPage>> {
    let auth = AuthService::new(state.pocketbase());

    let offers = auth
        .merchant_offers(&merchant.id, &merchant.store_token)
        .await?;
    let orders = auth
        .merchant_orders(&merchant.id, &merchant.store_token)
        .await?;
    let categories = state.catalog().categories().await?;

    // Display name comes from the record, not the session copy.
    let business_name = match auth.merchant_data(&merchant.id, &merchant.store_token).await {
        Ok(record) => record.business_name,
        Err(e) => {
            tracing::warn!("Failed to refresh merchant record: {}", e);
            merchant.name
        }
    };

    Ok(Json(DashboardPage {
        business_name,
        offers,
        orders,
        categories,
        error: query.error,
        success: query.success,
    }))
}

/// Handle new offer form submission.
///
/// The offer is filed under the signed-in merchant; new offers always start
/// out active.
pub async fn create_offer(
    State(state): State<AppState>,
    RequireMerchant(merchant): RequireMerchant,
    Form(form): Form<NewOfferForm>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());
    let new_offer = NewOffer {
        category_id: CategoryId::new(form.category_id),
        discount: form.discount,
        start_date: form.start_date,
        end_date: form.end_date,
    };

    match auth
        .add_offer(&merchant.id, &new_offer, &merchant.store_token)
        .await
    {
        Ok(_) => Redirect::to("/merchant/dashboard?success=offer_created").into_response(),
        Err(e) => {
            tracing::warn!("Offer creation failed: {}", e);
            Redirect::to("/merchant/dashboard?error=offer_create_failed").into_response()
        }
    }
}

/// Handle offer update form submission.
pub async fn update_offer(
    State(state): State<AppState>,
    RequireMerchant(merchant): RequireMerchant,
    Path(id): Path<String>,
    Form(form): Form<OfferUpdateForm>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());
    let patch = OfferUpdate {
        category_id: form.category_id.map(CategoryId::new),
        discount: form.discount,
        start_date: form.start_date,
        end_date: form.end_date,
        status: form.status,
    };

    match auth
        .update_offer(&OfferId::new(id), &patch, &merchant.store_token)
        .await
    {
        Ok(_) => Redirect::to("/merchant/dashboard?success=offer_updated").into_response(),
        Err(e) => {
            tracing::warn!("Offer update failed: {}", e);
            Redirect::to("/merchant/dashboard?error=offer_update_failed").into_response()
        }
    }
}

/// Handle offer deletion.
///
/// Called from the dashboard over `fetch`, so this answers with a status
/// code instead of a redirect.
pub async fn delete_offer(
    State(state): State<AppState>,
    RequireMerchant(merchant): RequireMerchant,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pocketbase());
    auth.delete_offer(&OfferId::new(id), &merchant.store_token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
