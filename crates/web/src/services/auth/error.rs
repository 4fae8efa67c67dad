//! Authentication error types.

use thiserror::Error;

use saverspot_core::EmailError;

use crate::pocketbase::{StoreError, ValidationField};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid credentials (wrong email or password, never distinguished).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The store rejected a field on signup or profile update.
    #[error("validation failed on {field}: {message}")]
    Validation {
        /// The rejected field.
        field: ValidationField,
        /// Store-provided message for that field.
        message: String,
    },

    /// Principal record not found.
    #[error("account not found")]
    AccountNotFound,

    /// Credential store failure with no auth-specific meaning.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    /// Lift store failures, keeping the variants callers branch on intact:
    /// field-tagged validation and credential rejection pass through, the
    /// rest collapses into `Store`.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { field, message } => Self::Validation { field, message },
            StoreError::InvalidCredentials => Self::InvalidCredentials,
            StoreError::NotFound(_) => Self::AccountNotFound,
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_passes_through_field_tag() {
        let err = AuthError::from(StoreError::Validation {
            field: ValidationField::Email,
            message: "The email is invalid or already in use.".to_string(),
        });

        assert!(matches!(
            err,
            AuthError::Validation {
                field: ValidationField::Email,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_credentials_passes_through() {
        let err = AuthError::from(StoreError::InvalidCredentials);
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_not_found_becomes_account_not_found() {
        let err = AuthError::from(StoreError::NotFound("users".to_string()));
        assert!(matches!(err, AuthError::AccountNotFound));
    }

    #[test]
    fn test_other_store_errors_wrap() {
        let err = AuthError::from(StoreError::Api {
            status: 500,
            message: "Something went wrong.".to_string(),
        });
        assert!(matches!(err, AuthError::Store(_)));
    }
}
