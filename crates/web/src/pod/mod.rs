//! External-identity (pod) bridge.
//!
//! Signed-in shoppers can link a Solid-style personal data pod. The link
//! runs in three phases, tracked as an explicit state machine stored in the
//! session under [`crate::models::session::keys::POD_LOGIN`]:
//!
//! 1. `POST /user/pod/login` discovers the issuer and redirects to its
//!    authorization endpoint (PKCE + state in the session).
//! 2. `GET /user/callback` validates the state, exchanges the code, and
//!    extracts the web-id from the identity token.
//! 3. The offers page fetches the transaction document from the pod's
//!    storage and parses it for the recommendation prompt.
//!
//! Every failure is logged and degrades the offers page to the plain
//! catalog; nothing in this flow is retried automatically.

mod oidc;
mod pkce;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use oidc::{
    AuthorizationRequest, PodOidcClient, ProviderMetadata, TokenResponse, normalize_issuer,
    storage_root_from_webid, web_id_from_id_token,
};

/// Errors from the pod login and document fetch flow.
#[derive(Debug, Error)]
pub enum PodError {
    /// The issuer is not a usable URL.
    #[error("invalid pod issuer: {0}")]
    InvalidIssuer(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Issuer metadata discovery failed.
    #[error("issuer discovery failed: {0}")]
    Discovery(String),

    /// The token endpoint rejected the code exchange.
    #[error("token exchange failed ({status}): {detail}")]
    TokenExchange {
        /// HTTP status from the token endpoint.
        status: u16,
        /// Response body, for the log.
        detail: String,
    },

    /// The callback `state` does not match the one stored in the session.
    #[error("authorization state mismatch")]
    StateMismatch,

    /// The identity token carries neither a `webid` claim nor a URL `sub`.
    #[error("identity token carries no web-id")]
    MissingWebId,

    /// The identity token could not be decoded.
    #[error("invalid identity token: {0}")]
    IdToken(String),

    /// The pod document could not be fetched or parsed.
    #[error("pod document fetch failed: {0}")]
    Document(String),
}

/// Session-resident state machine for the pod link.
///
/// Serialized into the session store; the access token never leaves the
/// server and is dropped once the document has been fetched.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PodLoginState {
    /// No pod link started.
    Unauthenticated,
    /// Redirected to the issuer; waiting for the callback.
    PendingExternalLogin {
        /// Random `state` parameter the callback must echo.
        state: String,
        /// PKCE code verifier for the token exchange.
        pkce_verifier: String,
        /// Normalized issuer the login was started against.
        issuer: String,
    },
    /// Code exchanged; web-id known, document not fetched yet.
    ExternalLoginActive {
        /// The shopper's web-id.
        web_id: String,
        /// Access token for the storage fetch.
        access_token: String,
    },
    /// A document fetch is in flight (or died mid-flight).
    FetchingPodData {
        /// The shopper's web-id.
        web_id: String,
        /// Access token for the storage fetch.
        access_token: String,
    },
    /// The transaction document is in hand.
    PodDataReady {
        /// The shopper's web-id.
        web_id: String,
        /// Parsed transaction document.
        document: serde_json::Value,
    },
    /// The flow failed; stays failed until the shopper starts over.
    Failed {
        /// What went wrong, for the log.
        reason: String,
    },
}

impl Default for PodLoginState {
    fn default() -> Self {
        Self::Unauthenticated
    }
}

impl PodLoginState {
    /// Short phase name for log fields.
    #[must_use]
    pub const fn phase(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::PendingExternalLogin { .. } => "pending_external_login",
            Self::ExternalLoginActive { .. } => "external_login_active",
            Self::FetchingPodData { .. } => "fetching_pod_data",
            Self::PodDataReady { .. } => "pod_data_ready",
            Self::Failed { .. } => "failed",
        }
    }

    /// True when `POST /user/pod/login` may start a fresh login.
    ///
    /// A login already underway (or completed) is left alone; a failed one
    /// may be started over by the shopper.
    #[must_use]
    pub const fn can_begin_login(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Failed { .. })
    }

    /// True when the callback should process an authorization response.
    #[must_use]
    pub const fn expects_callback(&self) -> bool {
        matches!(self, Self::PendingExternalLogin { .. })
    }

    /// True when the offers page should fetch the pod document.
    ///
    /// Covers a fetch that died mid-flight; a completed or failed flow
    /// never re-fetches.
    #[must_use]
    pub const fn should_fetch_document(&self) -> bool {
        matches!(
            self,
            Self::ExternalLoginActive { .. } | Self::FetchingPodData { .. }
        )
    }

    /// The web-id, once external login has completed.
    #[must_use]
    pub fn web_id(&self) -> Option<&str> {
        match self {
            Self::ExternalLoginActive { web_id, .. }
            | Self::FetchingPodData { web_id, .. }
            | Self::PodDataReady { web_id, .. } => Some(web_id),
            _ => None,
        }
    }

    /// The fetched transaction document, when ready.
    #[must_use]
    pub fn document(&self) -> Option<&serde_json::Value> {
        match self {
            Self::PodDataReady { document, .. } => Some(document),
            _ => None,
        }
    }
}

/// Redacts tokens and the PKCE verifier; the document is elided.
impl std::fmt::Debug for PodLoginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Unauthenticated"),
            Self::PendingExternalLogin { issuer, .. } => f
                .debug_struct("PendingExternalLogin")
                .field("issuer", issuer)
                .field("state", &"[REDACTED]")
                .field("pkce_verifier", &"[REDACTED]")
                .finish(),
            Self::ExternalLoginActive { web_id, .. } => f
                .debug_struct("ExternalLoginActive")
                .field("web_id", web_id)
                .field("access_token", &"[REDACTED]")
                .finish(),
            Self::FetchingPodData { web_id, .. } => f
                .debug_struct("FetchingPodData")
                .field("web_id", web_id)
                .field("access_token", &"[REDACTED]")
                .finish(),
            Self::PodDataReady { web_id, .. } => f
                .debug_struct("PodDataReady")
                .field("web_id", web_id)
                .finish_non_exhaustive(),
            Self::Failed { reason } => {
                f.debug_struct("Failed").field("reason", reason).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> PodLoginState {
        PodLoginState::ExternalLoginActive {
            web_id: "https://server1.sgpod.co/alice/profile/card#me".to_string(),
            access_token: "at-secret".to_string(),
        }
    }

    #[test]
    fn test_default_is_unauthenticated() {
        assert_eq!(PodLoginState::default(), PodLoginState::Unauthenticated);
    }

    #[test]
    fn test_begin_login_allowed_from_unauthenticated_and_failed() {
        assert!(PodLoginState::Unauthenticated.can_begin_login());
        assert!(
            PodLoginState::Failed {
                reason: "state mismatch".to_string()
            }
            .can_begin_login()
        );
    }

    #[test]
    fn test_begin_login_is_idempotent_once_underway() {
        let pending = PodLoginState::PendingExternalLogin {
            state: "s".to_string(),
            pkce_verifier: "v".to_string(),
            issuer: "https://server1.sgpod.co/".to_string(),
        };
        assert!(!pending.can_begin_login());
        assert!(!active().can_begin_login());
        assert!(
            !PodLoginState::PodDataReady {
                web_id: "https://example.org/me".to_string(),
                document: serde_json::json!({}),
            }
            .can_begin_login()
        );
    }

    #[test]
    fn test_only_pending_expects_callback() {
        let pending = PodLoginState::PendingExternalLogin {
            state: "s".to_string(),
            pkce_verifier: "v".to_string(),
            issuer: "https://server1.sgpod.co/".to_string(),
        };
        assert!(pending.expects_callback());
        assert!(!PodLoginState::Unauthenticated.expects_callback());
        assert!(!active().expects_callback());
    }

    #[test]
    fn test_fetch_guard_covers_active_and_in_flight() {
        assert!(active().should_fetch_document());
        assert!(
            PodLoginState::FetchingPodData {
                web_id: "https://example.org/me".to_string(),
                access_token: "at".to_string(),
            }
            .should_fetch_document()
        );

        // Ready and failed both suppress a re-fetch.
        assert!(
            !PodLoginState::PodDataReady {
                web_id: "https://example.org/me".to_string(),
                document: serde_json::json!({"transactions": []}),
            }
            .should_fetch_document()
        );
        assert!(
            !PodLoginState::Failed {
                reason: "fetch failed".to_string()
            }
            .should_fetch_document()
        );
    }

    #[test]
    fn test_document_only_when_ready() {
        let ready = PodLoginState::PodDataReady {
            web_id: "https://example.org/me".to_string(),
            document: serde_json::json!({"transactions": [1, 2]}),
        };
        assert!(ready.document().is_some());
        assert!(active().document().is_none());
    }

    #[test]
    fn test_pending_survives_session_serialization() {
        let pending = PodLoginState::PendingExternalLogin {
            state: "st-123".to_string(),
            pkce_verifier: "ver-456".to_string(),
            issuer: "https://server1.sgpod.co/".to_string(),
        };

        let json = serde_json::to_string(&pending).expect("serialize");
        let restored: PodLoginState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, pending);
        assert!(json.contains("pending_external_login"));
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let debug = format!("{:?}", active());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("at-secret"));
    }
}
