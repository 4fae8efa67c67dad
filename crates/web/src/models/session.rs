//! Session-resident types.
//!
//! Types stored in the session for authentication state. Pod login state is
//! also session-resident but lives with the pod bridge.

use serde::{Deserialize, Serialize};

use saverspot_core::{Email, MerchantId, PrincipalKind, UserId};

use super::merchant::Merchant;
use super::user::User;

/// The signed-in principal carried by the session.
///
/// Exactly one principal lives in a session at a time: signing in as one
/// kind replaces a principal of the other kind outright, so a session can
/// never be both a shopper and a merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPrincipal {
    /// Whether this is a shopper or a merchant.
    pub kind: PrincipalKind,
    /// Record ID in the principal's auth collection.
    pub id: String,
    /// Login email address.
    pub email: Email,
    /// Display name: the username for shoppers, the business name for
    /// merchants.
    pub name: String,
    /// Store token issued at sign-in, replayed on record calls.
    pub store_token: String,
    /// Unix timestamp of the sign-in that created this principal.
    pub signed_in_at: i64,
}

impl SessionPrincipal {
    /// Build the principal for a shopper who just authenticated.
    #[must_use]
    pub fn for_user(user: &User, store_token: String) -> Self {
        Self {
            kind: PrincipalKind::User,
            id: user.id.as_str().to_string(),
            email: user.email.clone(),
            name: user.username.clone(),
            store_token,
            signed_in_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Build the principal for a merchant who just authenticated.
    #[must_use]
    pub fn for_merchant(merchant: &Merchant, store_token: String) -> Self {
        Self {
            kind: PrincipalKind::Merchant,
            id: merchant.id.as_str().to_string(),
            email: merchant.email.clone(),
            name: merchant.business_name.clone(),
            store_token,
            signed_in_at: chrono::Utc::now().timestamp(),
        }
    }

    /// View this principal as a shopper, if that is its kind.
    #[must_use]
    pub fn as_user(&self) -> Option<CurrentUser> {
        (self.kind == PrincipalKind::User).then(|| CurrentUser {
            id: UserId::new(self.id.clone()),
            email: self.email.clone(),
            name: self.name.clone(),
            store_token: self.store_token.clone(),
        })
    }

    /// View this principal as a merchant, if that is its kind.
    #[must_use]
    pub fn as_merchant(&self) -> Option<CurrentMerchant> {
        (self.kind == PrincipalKind::Merchant).then(|| CurrentMerchant {
            id: MerchantId::new(self.id.clone()),
            email: self.email.clone(),
            name: self.name.clone(),
            store_token: self.store_token.clone(),
        })
    }
}

/// Session-derived identity of a signed-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's record ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Store token for record calls on the user's behalf.
    pub store_token: String,
}

/// Session-derived identity of a signed-in merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMerchant {
    /// Merchant's record ID.
    pub id: MerchantId,
    /// Merchant's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Store token for record calls on the merchant's behalf.
    pub store_token: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in principal.
    pub const PRINCIPAL: &str = "principal";

    /// Key for pod login state (external-identity bridge).
    pub const POD_LOGIN: &str = "pod_login";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(kind: PrincipalKind) -> SessionPrincipal {
        SessionPrincipal {
            kind,
            id: "k2f0a9qb81xmc4e".to_string(),
            email: Email::parse("a@b.com").expect("valid email"),
            name: "alice".to_string(),
            store_token: "tok".to_string(),
            signed_in_at: 1_755_907_200,
        }
    }

    #[test]
    fn test_principal_kinds_are_mutually_exclusive() {
        let user = principal(PrincipalKind::User);
        assert!(user.as_user().is_some());
        assert!(user.as_merchant().is_none());

        let merchant = principal(PrincipalKind::Merchant);
        assert!(merchant.as_merchant().is_some());
        assert!(merchant.as_user().is_none());
    }

    #[test]
    fn test_principal_round_trips_through_serde() {
        let original = principal(PrincipalKind::Merchant);
        let json = serde_json::to_string(&original).expect("serialize");
        let restored: SessionPrincipal = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.kind, PrincipalKind::Merchant);
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.store_token, original.store_token);
    }
}
