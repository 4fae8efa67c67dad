//! Offer, category, and order types.

use serde::{Deserialize, Serialize};

use saverspot_core::{CategoryId, MerchantId, OfferId, OfferStatus, OrderId};

/// A discount offer, as stored in the `offers` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    /// Unique record ID.
    pub id: OfferId,
    /// Merchant that published the offer.
    pub merchant_id: MerchantId,
    /// Category the offer is filed under.
    pub category_id: CategoryId,
    /// Discount percentage.
    #[serde(default)]
    pub discount: f64,
    /// First day the offer is valid, as stored.
    #[serde(default)]
    pub start_date: String,
    /// Last day the offer is valid, as stored.
    #[serde(default)]
    pub end_date: String,
    /// Lifecycle status; `active` on creation.
    #[serde(default)]
    pub status: OfferStatus,
}

/// An offer category, as stored in the `category` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique record ID.
    pub id: CategoryId,
    /// Display name (e.g. "Dining").
    #[serde(default)]
    pub name: String,
}

/// A redemption recorded against a merchant. Read-only here; listed on the
/// merchant dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique record ID.
    pub id: OrderId,
    /// Merchant the order belongs to.
    pub merchant_id: MerchantId,
    /// Customer display name.
    #[serde(default)]
    pub customer: String,
    /// Order total.
    #[serde(default)]
    pub total: f64,
    /// Fulfilment status shown on the dashboard.
    #[serde(default)]
    pub status: String,
    /// Store-assigned creation timestamp, as stored.
    #[serde(default)]
    pub created: String,
}

/// Fields a merchant supplies when publishing an offer.
///
/// The owning merchant and the lifecycle status are not part of this payload:
/// handlers set the merchant from the session, and new offers are always
/// created `active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOffer {
    /// Category to file the offer under.
    pub category_id: CategoryId,
    /// Discount percentage.
    pub discount: f64,
    /// First day the offer is valid.
    pub start_date: String,
    /// Last day the offer is valid.
    pub end_date: String,
}

/// Partial update to an existing offer; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferUpdate {
    /// Move the offer to another category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Change the discount percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    /// Change the first valid day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Change the last valid day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Activate or park the offer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OfferStatus>,
}

/// An offer denormalized for display: relation ids swapped for names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferDetails {
    /// The underlying offer ID.
    pub id: OfferId,
    /// Business name of the offering merchant.
    pub merchant_name: String,
    /// Name of the offer's category.
    pub category_name: String,
    /// Discount percentage.
    pub discount: f64,
    /// First day the offer is valid.
    pub start_date: String,
    /// Last day the offer is valid.
    pub end_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_status_defaults_to_active() {
        let json = r#"{
            "id": "o1a2b3c4d5e6f7g",
            "merchant_id": "m3c9d2e7f8g1h4j",
            "category_id": "c9x8y7z6w5v4u3t",
            "discount": 20,
            "start_date": "2026-08-01",
            "end_date": "2026-08-31"
        }"#;

        let offer: Offer = serde_json::from_str(json).expect("deserialize");
        assert_eq!(offer.status, OfferStatus::Active);
        assert!((offer.discount - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_offer_update_skips_absent_fields() {
        let patch = OfferUpdate {
            discount: Some(25.0),
            ..OfferUpdate::default()
        };

        let out = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(out["discount"], 25.0);
        assert!(out.get("category_id").is_none());
        assert!(out.get("status").is_none());
    }

    #[test]
    fn test_order_uses_store_field_names() {
        let json = r#"{
            "id": "r5t6y7u8i9o0p1q",
            "merchant_id": "m3c9d2e7f8g1h4j",
            "customer": "Alice",
            "total": 42.5,
            "status": "completed",
            "created": "2026-08-02 10:00:00.000Z"
        }"#;

        let order: Order = serde_json::from_str(json).expect("deserialize");
        assert_eq!(order.customer, "Alice");
        assert_eq!(order.status, "completed");
    }
}
