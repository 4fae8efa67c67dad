//! `PocketBase` credential store client.
//!
//! # Architecture
//!
//! - Thin REST client over the `PocketBase` records API
//! - `PocketBase` is source of truth - NO local sync, direct API calls
//! - Auth tokens are issued per sign-in, carried in the session, and replayed
//!   on each record call
//!
//! # Collections
//!
//! - `users` / `merchants` - auth collections, one per principal kind
//! - `offers` - merchant discount offers
//! - `category` - offer categories
//! - `orders` - redemptions recorded against a merchant
//!
//! # Example
//!
//! ```rust,ignore
//! use saverspot_web::pocketbase::PocketBaseClient;
//!
//! let store = PocketBaseClient::new("http://127.0.0.1:8090");
//!
//! // Authenticate a user
//! let auth = store
//!     .auth_with_password::<User>("users", "a@b.com", "secret123")
//!     .await?;
//!
//! // Use the issued token for record calls
//! let user: User = store.get_one("users", auth.record.id.as_str(), Some(&auth.token)).await?;
//! ```

mod client;

pub use client::{AuthResponse, PocketBaseClient, relation_filter};

use thiserror::Error;

/// Record-store collection names.
pub mod collections {
    /// Shopper auth collection.
    pub const USERS: &str = "users";
    /// Merchant auth collection.
    pub const MERCHANTS: &str = "merchants";
    /// Discount offers.
    pub const OFFERS: &str = "offers";
    /// Offer categories. Singular in the store schema.
    pub const CATEGORY: &str = "category";
    /// Redemptions recorded against merchants.
    pub const ORDERS: &str = "orders";
}

/// Record fields that can fail validation on create or update.
///
/// The store reports failures keyed by wire field name; this enum is the
/// domain-side tag those keys are mapped onto at the client boundary, so the
/// rest of the app never matches on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationField {
    Email,
    Username,
    Password,
    ContactName,
    BusinessName,
    BusinessType,
    PodIssuer,
}

impl ValidationField {
    /// Fields in reporting order: when several fail at once, the first one
    /// present in the store's error payload is the one surfaced.
    pub const PRIORITY: [Self; 7] = [
        Self::Email,
        Self::Username,
        Self::Password,
        Self::ContactName,
        Self::BusinessName,
        Self::BusinessType,
        Self::PodIssuer,
    ];

    /// The key this field uses in store payloads.
    ///
    /// Note the business name travels as `merchantName`, a legacy of the
    /// store schema.
    #[must_use]
    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::Password => "password",
            Self::ContactName => "contactName",
            Self::BusinessName => "merchantName",
            Self::BusinessType => "businessType",
            Self::PodIssuer => "podIssuer",
        }
    }
}

impl std::fmt::Display for ValidationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::Password => "password",
            Self::ContactName => "contact name",
            Self::BusinessName => "business name",
            Self::BusinessType => "business type",
            Self::PodIssuer => "pod issuer",
        };
        f.write_str(name)
    }
}

/// Pick the highest-priority failing field out of a store error payload.
///
/// Store errors carry a `data` map keyed by field name, each entry holding a
/// code and message. Only one failure is surfaced per request, chosen by
/// [`ValidationField::PRIORITY`].
#[must_use]
pub fn first_failing_field(
    data: &serde_json::Map<String, serde_json::Value>,
) -> Option<(ValidationField, String)> {
    ValidationField::PRIORITY.into_iter().find_map(|field| {
        data.get(field.wire_key()).map(|entry| {
            let message = entry
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Invalid value.")
                .to_string();
            (field, message)
        })
    })
}

/// Errors that can occur when interacting with the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A create or update was rejected with per-field errors.
    #[error("validation failed on {field}: {message}")]
    Validation {
        /// Highest-priority failing field.
        field: ValidationField,
        /// Store-provided message for that field.
        message: String,
    },

    /// Password authentication was rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Record not found.
    #[error("record not found in {0}")]
    NotFound(String),

    /// Store rejected the request for another reason.
    #[error("store request failed ({status}): {message}")]
    Api {
        /// HTTP status returned by the store.
        status: u16,
        /// Message from the store's error body, or the raw body.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_data(fields: &[(&str, &str)]) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for (key, message) in fields {
            map.insert(
                (*key).to_string(),
                serde_json::json!({ "code": "validation_failed", "message": message }),
            );
        }
        map
    }

    #[test]
    fn test_first_failing_field_empty() {
        assert!(first_failing_field(&serde_json::Map::new()).is_none());
    }

    #[test]
    fn test_first_failing_field_email_beats_password() {
        let data = error_data(&[
            ("password", "Must be at least 8 characters."),
            ("email", "The email is invalid or already in use."),
        ]);

        let (field, message) = first_failing_field(&data).expect("a field should match");
        assert_eq!(field, ValidationField::Email);
        assert_eq!(message, "The email is invalid or already in use.");
    }

    #[test]
    fn test_first_failing_field_username_beats_pod_issuer() {
        let data = error_data(&[
            ("podIssuer", "Must be a valid URL."),
            ("username", "Already taken."),
        ]);

        let (field, _) = first_failing_field(&data).expect("a field should match");
        assert_eq!(field, ValidationField::Username);
    }

    #[test]
    fn test_first_failing_field_merchant_name_maps_to_business_name() {
        let data = error_data(&[("merchantName", "Cannot be blank.")]);

        let (field, message) = first_failing_field(&data).expect("a field should match");
        assert_eq!(field, ValidationField::BusinessName);
        assert_eq!(message, "Cannot be blank.");
    }

    #[test]
    fn test_first_failing_field_unknown_keys_ignored() {
        let data = error_data(&[("somethingElse", "Unknown.")]);
        assert!(first_failing_field(&data).is_none());
    }

    #[test]
    fn test_first_failing_field_missing_message_uses_fallback() {
        let mut data = serde_json::Map::new();
        data.insert("email".to_string(), serde_json::json!({ "code": "bad" }));

        let (field, message) = first_failing_field(&data).expect("a field should match");
        assert_eq!(field, ValidationField::Email);
        assert_eq!(message, "Invalid value.");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Validation {
            field: ValidationField::BusinessName,
            message: "Cannot be blank.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "validation failed on business name: Cannot be blank."
        );

        let err = StoreError::InvalidCredentials;
        assert_eq!(err.to_string(), "invalid credentials");

        let err = StoreError::NotFound("offers".to_string());
        assert_eq!(err.to_string(), "record not found in offers");

        let err = StoreError::Api {
            status: 403,
            message: "Only admins can access this action.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "store request failed (403): Only admins can access this action."
        );
    }
}
