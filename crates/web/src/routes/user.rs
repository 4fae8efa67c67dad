//! Shopper route handlers.
//!
//! Signup, sign-in, profile, and the public offer catalog, plus the
//! three-phase pod login flow that unlocks personalized recommendations:
//! redirect to the external issuer, handle its callback, then fetch the
//! shopper's transaction document from pod storage.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use saverspot_core::Email;

use crate::claude::Recommendation;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalPrincipal, RequireUser, set_principal};
use crate::models::offer::OfferDetails;
use crate::models::session::{SessionPrincipal, keys};
use crate::models::user::{User, UserUpdate};
use crate::pod::{AuthorizationRequest, PodError, PodLoginState, normalize_issuer};
use crate::services::AuthService;
use crate::state::AppState;

use super::auth_error_code;

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Profile update form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub username: Option<String>,
    pub pod_issuer: Option<String>,
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

/// Query parameters delivered by the pod issuer on the authorization
/// callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Page Types
// =============================================================================

/// Signup page body.
#[derive(Debug, Serialize)]
pub struct SignupPage {
    pub error: Option<String>,
}

/// Sign-in page body.
#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Profile page body.
#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub user: User,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Savings dashboard body.
#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub username: String,
    pub email: Email,
    pub total_savings: Option<f64>,
    pub transaction_history: Option<serde_json::Value>,
}

/// Offer catalog body.
///
/// `recommendations` is empty unless the shopper's pod document is ready and
/// the recommendation client is configured; `pod_phase` tells the page where
/// the pod flow stands.
#[derive(Debug, Serialize)]
pub struct OffersPage {
    pub offers: Vec<OfferDetails>,
    pub recommendations: Vec<Recommendation>,
    pub pod_phase: &'static str,
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalPrincipal(principal): OptionalPrincipal,
    Query(query): Query<MessageQuery>,
) -> Response {
    if principal.is_some_and(|p| p.as_user().is_some()) {
        return Redirect::to("/user/profile").into_response();
    }
    Json(SignupPage { error: query.error }).into_response()
}

/// Handle signup form submission.
///
/// Creates the shopper account; the shopper signs in afterwards.
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let auth = AuthService::new(state.pocketbase());

    match auth.sign_up(&form.email, &form.password, &form.name).await {
        Ok(_) => Redirect::to("/user/login?success=account_created").into_response(),
        Err(e) => {
            tracing::warn!("Signup failed: {}", e);
            Redirect::to(&format!("/user/signup?error={}", auth_error_code(&e))).into_response()
        }
    }
}

// =============================================================================
// Sign-in Routes
// =============================================================================

/// Display the sign-in page.
pub async fn login_page(
    OptionalPrincipal(principal): OptionalPrincipal,
    Query(query): Query<MessageQuery>,
) -> Response {
    if principal.is_some_and(|p| p.as_user().is_some()) {
        return Redirect::to("/user/profile").into_response();
    }
    Json(LoginPage {
        error: query.error,
        success: query.success,
    })
    .into_response()
}

/// Handle sign-in form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());

    match auth.sign_in(&form.email, &form.password).await {
        Ok((user, token)) => {
            let principal = SessionPrincipal::for_user(&user, token);

            if let Err(e) = set_principal(&session, &principal).await {
                tracing::error!("Failed to set session: {}", e);
                return Redirect::to("/user/login?error=session").into_response();
            }

            set_sentry_user(&principal.id, Some(principal.email.as_str()));
            add_breadcrumb("auth", "User signed in", Some(&[("user_id", principal.id.as_str())]));

            Redirect::to("/user/profile").into_response()
        }
        Err(e) => {
            tracing::warn!("Sign-in failed: {}", e);
            Redirect::to(&format!("/user/login?error={}", auth_error_code(&e))).into_response()
        }
    }
}

/// Handle sign-out.
///
/// Flushing the session drops the principal and any pod login state with it.
pub async fn logout(session: Session) -> Response {
    clear_sentry_user();

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/").into_response()
}

// =============================================================================
// Profile Routes
// =============================================================================

/// Display the profile page.
pub async fn profile_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<MessageQuery>,
) -> Result<Json<ProfilePage>> {
    let auth = AuthService::new(state.pocketbase());
    let record = auth.user_data(&user.id, &user.store_token).await?;

    Ok(Json(ProfilePage {
        user: record,
        error: query.error,
        success: query.success,
    }))
}

/// Handle profile update form submission.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Form(form): Form<ProfileForm>,
) -> Response {
    let auth = AuthService::new(state.pocketbase());

    // An empty username is treated as absent; an empty issuer is a deliberate
    // reset of the override.
    let patch = UserUpdate {
        username: form.username.filter(|v| !v.is_empty()),
        pod_issuer: form.pod_issuer,
    };

    match auth.update_user(&user.id, &patch, &user.store_token).await {
        Ok(_) => Redirect::to("/user/profile?success=saved").into_response(),
        Err(e) => {
            tracing::warn!("Profile update failed: {}", e);
            Redirect::to(&format!("/user/profile?error={}", auth_error_code(&e))).into_response()
        }
    }
}

/// Display the savings dashboard.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<DashboardPage>> {
    let auth = AuthService::new(state.pocketbase());
    let record = auth.user_data(&user.id, &user.store_token).await?;

    Ok(Json(DashboardPage {
        username: record.username,
        email: record.email,
        total_savings: record.total_savings,
        transaction_history: record.transaction_history,
    }))
}

// =============================================================================
// Offer Catalog
// =============================================================================

/// Display the offer catalog.
///
/// Public. For signed-in shoppers this also advances the pod flow's document
/// phase and, when the document is ready and a recommendation client is
/// configured, asks for personalized picks. Every extra is best-effort: any
/// failure leaves the plain catalog intact.
pub async fn offers(
    State(state): State<AppState>,
    OptionalPrincipal(principal): OptionalPrincipal,
    session: Session,
) -> Result<Json<OffersPage>> {
    let offers = state.catalog().offers_with_details().await?;

    let mut recommendations = Vec::new();
    let mut pod_state = PodLoginState::default();

    if principal.is_some_and(|p| p.as_user().is_some()) {
        pod_state = advance_pod_login(&state, &session).await;

        if let Some(document) = pod_state.document() {
            if let Some(client) = state.recommendations() {
                match client.recommend_offers(document, &offers).await {
                    Ok(recs) => recommendations = recs,
                    Err(e) => tracing::warn!("Offer recommendations unavailable: {}", e),
                }
            }
        }
    }

    Ok(Json(OffersPage {
        offers,
        recommendations,
        pod_phase: pod_state.phase(),
    }))
}

// =============================================================================
// Pod Login Routes
// =============================================================================

/// Start the pod login flow.
///
/// Discovers the shopper's issuer, stashes the PKCE verifier and `state`
/// in the session, and redirects to the issuer's authorization endpoint.
/// A flow already underway (or finished) is left alone.
pub async fn pod_login(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    session: Session,
) -> Response {
    let current = pod_login_state(&session).await;
    if !current.can_begin_login() {
        return Redirect::to("/user/offers").into_response();
    }

    // The shopper's own issuer wins over the configured default; an empty
    // field on the record counts as unset.
    let auth = AuthService::new(state.pocketbase());
    let issuer_raw = match auth.user_data(&user.id, &user.store_token).await {
        Ok(record) => record
            .pod_issuer
            .filter(|issuer| !issuer.is_empty())
            .unwrap_or_else(|| state.config().pod_issuer.clone()),
        Err(e) => {
            tracing::warn!("Could not read pod issuer from profile: {}", e);
            state.config().pod_issuer.clone()
        }
    };

    let (issuer, request) = match begin_pod_login(&state, &issuer_raw).await {
        Ok(parts) => parts,
        Err(e) => return fail_pod_login(&session, &e.to_string()).await,
    };

    let pending = PodLoginState::PendingExternalLogin {
        state: request.state,
        pkce_verifier: request.code_verifier,
        issuer,
    };
    if let Err(e) = session.insert(keys::POD_LOGIN, &pending).await {
        tracing::error!("Failed to store pod login state: {}", e);
        return Redirect::to("/user/offers?error=session").into_response();
    }

    Redirect::to(&request.url).into_response()
}

/// Handle the authorization callback from the pod issuer.
///
/// Validates `state`, exchanges the code, and extracts the web-id from the
/// identity token. A token without a web-id is a hard failure. Callbacks
/// arriving outside a pending flow are ignored, so a repeated or stale
/// redirect cannot disturb an established login.
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let current = pod_login_state(&session).await;
    if !current.expects_callback() {
        tracing::debug!(phase = current.phase(), "Callback outside a pending pod login");
        return Redirect::to("/user/offers").into_response();
    }
    let PodLoginState::PendingExternalLogin {
        state: expected_state,
        pkce_verifier,
        issuer,
    } = current
    else {
        return Redirect::to("/user/offers").into_response();
    };

    if let Some(err) = query.error {
        return fail_pod_login(&session, &format!("issuer refused authorization: {err}")).await;
    }
    let (Some(code), Some(callback_state)) = (query.code, query.state) else {
        return fail_pod_login(&session, "callback missing code or state").await;
    };
    if callback_state != expected_state {
        return fail_pod_login(&session, &PodError::StateMismatch.to_string()).await;
    }

    match complete_pod_login(&state, &issuer, &code, &pkce_verifier).await {
        Ok((web_id, access_token)) => {
            tracing::info!("Pod login established");
            add_breadcrumb("pod", "Pod login established", None);
            store_pod_login_state(
                &session,
                &PodLoginState::ExternalLoginActive {
                    web_id,
                    access_token,
                },
            )
            .await;
            Redirect::to("/user/offers").into_response()
        }
        Err(e) => fail_pod_login(&session, &e.to_string()).await,
    }
}

// =============================================================================
// Pod Flow Helpers
// =============================================================================

/// Read the pod login state from the session, defaulting to unauthenticated.
async fn pod_login_state(session: &Session) -> PodLoginState {
    match session.get::<PodLoginState>(keys::POD_LOGIN).await {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Failed to read pod login state: {}", e);
            PodLoginState::default()
        }
    }
}

/// Write the pod login state back to the session, best effort.
async fn store_pod_login_state(session: &Session, state: &PodLoginState) {
    if let Err(e) = session.insert(keys::POD_LOGIN, state).await {
        tracing::warn!("Failed to store pod login state: {}", e);
    }
}

/// Resolve the issuer and build the authorization redirect.
async fn begin_pod_login(
    state: &AppState,
    issuer_raw: &str,
) -> std::result::Result<(String, AuthorizationRequest), PodError> {
    let issuer = normalize_issuer(issuer_raw)?;
    let metadata = state.pod().discover(&issuer).await?;
    let request = state.pod().authorization_request(&metadata)?;
    Ok((issuer.to_string(), request))
}

/// Exchange the authorization code and pull the web-id out of the reply.
async fn complete_pod_login(
    state: &AppState,
    issuer: &str,
    code: &str,
    pkce_verifier: &str,
) -> std::result::Result<(String, String), PodError> {
    let issuer = normalize_issuer(issuer)?;
    let metadata = state.pod().discover(&issuer).await?;
    let token = state.pod().exchange_code(&metadata, code, pkce_verifier).await?;
    let web_id = token.web_id()?;
    Ok((web_id, token.access_token))
}

/// Mark the pod flow failed and bounce back to the offers page.
///
/// Failures here are never retried automatically; the shopper can start the
/// flow again from the offers page.
async fn fail_pod_login(session: &Session, reason: &str) -> Response {
    tracing::error!("Pod login failed: {}", reason);
    store_pod_login_state(
        session,
        &PodLoginState::Failed {
            reason: reason.to_string(),
        },
    )
    .await;
    Redirect::to("/user/offers?error=pod_login_failed").into_response()
}

/// Run the document phase of the pod flow if the session is ready for it.
///
/// A login that already carries an access token moves through
/// `FetchingPodData` to `PodDataReady` or `Failed`; every other state passes
/// through untouched. Writing `FetchingPodData` before the fetch means a
/// request that dies mid-flight leaves a state the next page load retries
/// from, not a stuck one.
async fn advance_pod_login(state: &AppState, session: &Session) -> PodLoginState {
    match pod_login_state(session).await {
        PodLoginState::ExternalLoginActive {
            web_id,
            access_token,
        }
        | PodLoginState::FetchingPodData {
            web_id,
            access_token,
        } => {
            let fetching = PodLoginState::FetchingPodData {
                web_id: web_id.clone(),
                access_token: access_token.clone(),
            };
            store_pod_login_state(session, &fetching).await;

            let next = match state.pod().fetch_document(&web_id, &access_token).await {
                Ok(document) => {
                    tracing::info!("Pod document fetched");
                    PodLoginState::PodDataReady { web_id, document }
                }
                Err(e) => {
                    tracing::warn!("Pod document fetch failed: {}", e);
                    PodLoginState::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            store_pod_login_state(session, &next).await;
            next
        }
        other => other,
    }
}
