//! Authentication and account operations.
//!
//! Sign-up, sign-in, and own-record data operations for both principal
//! kinds, plus the merchant-scoped offer CRUD. Everything here is a thin
//! translation layer over the credential store: the store validates and
//! persists, this service shapes payloads and lifts `StoreError` into
//! [`AuthError`].

mod error;

pub use error::AuthError;

use serde::Serialize;

use saverspot_core::{Email, MerchantId, OfferId, OfferStatus, UserId};

use crate::models::merchant::{Merchant, MerchantUpdate};
use crate::models::offer::{NewOffer, Offer, OfferUpdate, Order};
use crate::models::user::{User, UserUpdate};
use crate::pocketbase::{PocketBaseClient, collections, relation_filter};

/// Authentication and account service.
///
/// Borrows the store client; construct one per request scope.
pub struct AuthService<'a> {
    store: &'a PocketBaseClient,
}

/// Create payload for an offer: caller fields plus the server-set parts.
#[derive(Serialize)]
struct CreateOfferPayload<'a> {
    merchant_id: &'a str,
    #[serde(flatten)]
    offer: &'a NewOffer,
    status: OfferStatus,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a PocketBaseClient) -> Self {
        Self { store }
    }

    // =========================================================================
    // Sign-up
    // =========================================================================

    /// Register a new shopper account.
    ///
    /// Does not establish a session; callers send the new account to the
    /// login page.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Validation` when the store rejects a field
    /// (duplicate email, weak password, taken username).
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let body = serde_json::json!({
            "username": name,
            "email": email.as_str(),
            "emailVisibility": true,
            "password": password,
            "passwordConfirm": password,
        });

        let user: User = self.store.create(collections::USERS, &body, None).await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Register a new merchant account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::Validation` when the store rejects a field.
    pub async fn sign_up_merchant(
        &self,
        email: &str,
        password: &str,
        name: &str,
        business_name: &str,
        contact_name: &str,
        business_type: &str,
    ) -> Result<Merchant, AuthError> {
        let email = Email::parse(email)?;

        let body = serde_json::json!({
            "username": name,
            "email": email.as_str(),
            "emailVisibility": true,
            "password": password,
            "passwordConfirm": password,
            "merchantName": business_name,
            "contactName": contact_name,
            "businessType": business_type,
        });

        let merchant: Merchant = self
            .store
            .create(collections::MERCHANTS, &body, None)
            .await?;

        tracing::info!(merchant_id = %merchant.id, "Merchant signed up");
        Ok(merchant)
    }

    // =========================================================================
    // Sign-in
    // =========================================================================

    /// Authenticate a shopper, returning the record and the store token to
    /// carry in the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email/password pair
    /// is rejected, without distinguishing which part was wrong.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        let auth = self
            .store
            .auth_with_password::<User>(collections::USERS, email.as_str(), password)
            .await?;

        tracing::info!(user_id = %auth.record.id, "User signed in");
        Ok((auth.record, auth.token))
    }

    /// Authenticate a merchant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when the email/password pair
    /// is rejected.
    pub async fn sign_in_merchant(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Merchant, String), AuthError> {
        let email = Email::parse(email)?;

        let auth = self
            .store
            .auth_with_password::<Merchant>(collections::MERCHANTS, email.as_str(), password)
            .await?;

        tracing::info!(merchant_id = %auth.record.id, "Merchant signed in");
        Ok((auth.record, auth.token))
    }

    // =========================================================================
    // Account Data
    // =========================================================================

    /// Re-fetch a shopper's own record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the record no longer exists
    /// or the token is not allowed to see it.
    pub async fn user_data(&self, id: &UserId, token: &str) -> Result<User, AuthError> {
        Ok(self
            .store
            .get_one(collections::USERS, id.as_str(), Some(token))
            .await?)
    }

    /// Re-fetch a merchant's own record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the record no longer exists.
    pub async fn merchant_data(&self, id: &MerchantId, token: &str) -> Result<Merchant, AuthError> {
        Ok(self
            .store
            .get_one(collections::MERCHANTS, id.as_str(), Some(token))
            .await?)
    }

    /// Apply a partial update to a shopper's own record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` when the store rejects a field.
    pub async fn update_user(
        &self,
        id: &UserId,
        patch: &UserUpdate,
        token: &str,
    ) -> Result<User, AuthError> {
        let user: User = self
            .store
            .update(collections::USERS, id.as_str(), patch, Some(token))
            .await?;

        tracing::info!(user_id = %user.id, "User profile updated");
        Ok(user)
    }

    /// Apply a partial update to a merchant's own record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` when the store rejects a field.
    pub async fn update_merchant(
        &self,
        id: &MerchantId,
        patch: &MerchantUpdate,
        token: &str,
    ) -> Result<Merchant, AuthError> {
        let merchant: Merchant = self
            .store
            .update(collections::MERCHANTS, id.as_str(), patch, Some(token))
            .await?;

        tracing::info!(merchant_id = %merchant.id, "Merchant settings updated");
        Ok(merchant)
    }

    // =========================================================================
    // Merchant Offers & Orders
    // =========================================================================

    /// List a merchant's own offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn merchant_offers(
        &self,
        merchant_id: &MerchantId,
        token: &str,
    ) -> Result<Vec<Offer>, AuthError> {
        let filter = relation_filter("merchant_id", merchant_id.as_str());
        Ok(self
            .store
            .get_full_list(collections::OFFERS, Some(&filter), Some(token))
            .await?)
    }

    /// List the orders recorded against a merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn merchant_orders(
        &self,
        merchant_id: &MerchantId,
        token: &str,
    ) -> Result<Vec<Order>, AuthError> {
        let filter = relation_filter("merchant_id", merchant_id.as_str());
        Ok(self
            .store
            .get_full_list(collections::ORDERS, Some(&filter), Some(token))
            .await?)
    }

    /// Publish a new offer for a merchant. New offers are always `active`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` when the store rejects a field.
    pub async fn add_offer(
        &self,
        merchant_id: &MerchantId,
        new_offer: &NewOffer,
        token: &str,
    ) -> Result<Offer, AuthError> {
        let payload = CreateOfferPayload {
            merchant_id: merchant_id.as_str(),
            offer: new_offer,
            status: OfferStatus::Active,
        };

        let offer: Offer = self
            .store
            .create(collections::OFFERS, &payload, Some(token))
            .await?;

        tracing::info!(merchant_id = %merchant_id, offer_id = %offer.id, "Offer created");
        Ok(offer)
    }

    /// Update an offer by id.
    ///
    /// Mutations are addressed by offer id alone; ownership is enforced by
    /// the store's collection rules, not re-checked here.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` when the store rejects a field.
    pub async fn update_offer(
        &self,
        id: &OfferId,
        patch: &OfferUpdate,
        token: &str,
    ) -> Result<Offer, AuthError> {
        let offer: Offer = self
            .store
            .update(collections::OFFERS, id.as_str(), patch, Some(token))
            .await?;

        tracing::info!(offer_id = %offer.id, "Offer updated");
        Ok(offer)
    }

    /// Delete an offer by id.
    ///
    /// Same ownership caveat as [`AuthService::update_offer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store request fails.
    pub async fn delete_offer(&self, id: &OfferId, token: &str) -> Result<(), AuthError> {
        self.store
            .delete(collections::OFFERS, id.as_str(), Some(token))
            .await?;

        tracing::info!(offer_id = %id, "Offer deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use saverspot_core::CategoryId;

    #[test]
    fn test_create_offer_payload_forces_active_status() {
        let new_offer = NewOffer {
            category_id: CategoryId::new("c9x8y7z6w5v4u3t"),
            discount: 20.0,
            start_date: "2026-08-01".to_string(),
            end_date: "2026-08-31".to_string(),
        };
        let payload = CreateOfferPayload {
            merchant_id: "m3c9d2e7f8g1h4j",
            offer: &new_offer,
            status: OfferStatus::Active,
        };

        let out = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(out["status"], "active");
        assert_eq!(out["merchant_id"], "m3c9d2e7f8g1h4j");
        assert_eq!(out["category_id"], "c9x8y7z6w5v4u3t");
        assert_eq!(out["discount"], 20.0);
    }
}
