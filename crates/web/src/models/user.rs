//! User domain types.

use serde::{Deserialize, Serialize};

use saverspot_core::{Email, UserId};

/// A shopper account, as stored in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique record ID.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    /// Display name chosen at signup.
    #[serde(default)]
    pub username: String,
    /// OIDC issuer of the user's pod, when one is on record.
    #[serde(rename = "podIssuer", default, skip_serializing_if = "Option::is_none")]
    pub pod_issuer: Option<String>,
    /// Lifetime savings shown on the dashboard, when tracked.
    #[serde(
        rename = "totalSavings",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_savings: Option<f64>,
    /// Past redemptions shown on the dashboard, when tracked.
    #[serde(
        rename = "transactionHistory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_history: Option<serde_json::Value>,
}

/// Partial update to a shopper's own record; absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    /// Change the display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Set or change the pod issuer on record.
    #[serde(rename = "podIssuer", default, skip_serializing_if = "Option::is_none")]
    pub pod_issuer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_minimal_record() {
        // Records created before the dashboard fields existed carry none of
        // the optional fields.
        let json = r#"{
            "id": "k2f0a9qb81xmc4e",
            "email": "a@b.com",
            "username": "alice"
        }"#;

        let user: User = serde_json::from_str(json).expect("deserialize");
        assert_eq!(user.username, "alice");
        assert!(user.pod_issuer.is_none());
        assert!(user.total_savings.is_none());
    }

    #[test]
    fn test_user_pod_issuer_wire_name() {
        let json = r#"{
            "id": "k2f0a9qb81xmc4e",
            "email": "a@b.com",
            "username": "alice",
            "podIssuer": "https://server1.sgpod.co"
        }"#;

        let user: User = serde_json::from_str(json).expect("deserialize");
        assert_eq!(user.pod_issuer.as_deref(), Some("https://server1.sgpod.co"));

        let out = serde_json::to_value(&user).expect("serialize");
        assert_eq!(out["podIssuer"], "https://server1.sgpod.co");
    }
}
