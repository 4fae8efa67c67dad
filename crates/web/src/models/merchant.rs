//! Merchant domain types.

use serde::{Deserialize, Serialize};

use saverspot_core::{Email, MerchantId};

/// A merchant account, as stored in the `merchants` collection.
///
/// The business name travels as `merchantName` on the wire, a legacy of the
/// store schema; everywhere else in this crate it is the business name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    /// Unique record ID.
    pub id: MerchantId,
    /// Login email address.
    pub email: Email,
    /// Account name chosen at signup.
    #[serde(default)]
    pub username: String,
    /// Business name shown beside offers.
    #[serde(rename = "merchantName", default)]
    pub business_name: String,
    /// Contact person for the account.
    #[serde(rename = "contactName", default)]
    pub contact_name: String,
    /// Line of business (e.g. "Food & Beverage").
    #[serde(rename = "businessType", default)]
    pub business_type: String,
}

/// Partial update to a merchant's own record; absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MerchantUpdate {
    /// Change the business name.
    #[serde(
        rename = "merchantName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub business_name: Option<String>,
    /// Change the contact person.
    #[serde(
        rename = "contactName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact_name: Option<String>,
    /// Change the line of business.
    #[serde(
        rename = "businessType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub business_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_business_name_wire_name() {
        let json = r#"{
            "id": "m3c9d2e7f8g1h4j",
            "email": "shop@example.net",
            "username": "shop",
            "merchantName": "Corner Bakery",
            "contactName": "Sam Lee",
            "businessType": "Food & Beverage"
        }"#;

        let merchant: Merchant = serde_json::from_str(json).expect("deserialize");
        assert_eq!(merchant.business_name, "Corner Bakery");

        let out = serde_json::to_value(&merchant).expect("serialize");
        assert_eq!(out["merchantName"], "Corner Bakery");
        assert!(out.get("business_name").is_none());
    }

    #[test]
    fn test_merchant_update_serializes_only_present_fields() {
        let patch = MerchantUpdate {
            contact_name: Some("Sam Lee".to_string()),
            ..MerchantUpdate::default()
        };

        let out = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(out["contactName"], "Sam Lee");
        assert!(out.get("merchantName").is_none());
        assert!(out.get("businessType").is_none());
    }
}
