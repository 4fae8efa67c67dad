//! Offer catalog: the public offers listing with names joined in.
//!
//! Offers reference merchants and categories by record id. The store has no
//! join surface, so this service fetches the three lists and joins them in
//! memory. The merchant and category directories change rarely and are
//! cached with `moka` (5-minute TTL); the offers list itself is always
//! fetched fresh.

use std::collections::HashMap;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use crate::models::merchant::Merchant;
use crate::models::offer::{Category, Offer, OfferDetails};
use crate::pocketbase::{PocketBaseClient, StoreError, collections};

/// Display name used when an offer's merchant reference does not resolve.
const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

/// Display name used when an offer's category reference does not resolve.
const UNKNOWN_CATEGORY: &str = "Unknown Category";

const MERCHANTS_KEY: &str = "merchants";
const CATEGORIES_KEY: &str = "categories";

/// Cached directory lists.
#[derive(Debug, Clone)]
enum CacheValue {
    Merchants(Vec<Merchant>),
    Categories(Vec<Category>),
}

/// Catalog of public offers with cached merchant/category directories.
#[derive(Clone)]
pub struct OfferCatalog {
    store: PocketBaseClient,
    cache: Cache<&'static str, CacheValue>,
}

impl OfferCatalog {
    /// Create a new catalog over the given store client.
    #[must_use]
    pub fn new(store: PocketBaseClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { store, cache }
    }

    /// List all offers with merchant and category names joined in.
    ///
    /// A dangling merchant or category reference resolves to a literal
    /// placeholder name rather than dropping the row or failing.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three list fetches fails.
    #[instrument(skip(self))]
    pub async fn offers_with_details(&self) -> Result<Vec<OfferDetails>, StoreError> {
        let offers: Vec<Offer> = self
            .store
            .get_full_list(collections::OFFERS, None, None)
            .await?;
        let merchants = self.merchant_directory().await?;
        let categories = self.categories().await?;

        Ok(join_offer_details(&offers, &merchants, &categories))
    }

    /// List all offer categories (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the list fetch fails.
    pub async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        if let Some(CacheValue::Categories(categories)) = self.cache.get(CATEGORIES_KEY).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .store
            .get_full_list(collections::CATEGORY, None, None)
            .await?;

        self.cache
            .insert(CATEGORIES_KEY, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// The merchant directory (cached).
    async fn merchant_directory(&self) -> Result<Vec<Merchant>, StoreError> {
        if let Some(CacheValue::Merchants(merchants)) = self.cache.get(MERCHANTS_KEY).await {
            debug!("Cache hit for merchants");
            return Ok(merchants);
        }

        let merchants: Vec<Merchant> = self
            .store
            .get_full_list(collections::MERCHANTS, None, None)
            .await?;

        self.cache
            .insert(MERCHANTS_KEY, CacheValue::Merchants(merchants.clone()))
            .await;

        Ok(merchants)
    }
}

/// Join offers against the merchant and category directories.
///
/// Pure over its inputs: unresolved references fall back to placeholder
/// names, and no row is ever dropped.
fn join_offer_details(
    offers: &[Offer],
    merchants: &[Merchant],
    categories: &[Category],
) -> Vec<OfferDetails> {
    let merchant_names: HashMap<&str, &str> = merchants
        .iter()
        .map(|m| (m.id.as_str(), m.business_name.as_str()))
        .collect();
    let category_names: HashMap<&str, &str> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    offers
        .iter()
        .map(|offer| OfferDetails {
            id: offer.id.clone(),
            merchant_name: merchant_names
                .get(offer.merchant_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_MERCHANT)
                .to_string(),
            category_name: category_names
                .get(offer.category_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_CATEGORY)
                .to_string(),
            discount: offer.discount,
            start_date: offer.start_date.clone(),
            end_date: offer.end_date.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use saverspot_core::{CategoryId, Email, MerchantId, OfferId, OfferStatus};

    fn offer(id: &str, merchant_id: &str, category_id: &str) -> Offer {
        Offer {
            id: OfferId::new(id),
            merchant_id: MerchantId::new(merchant_id),
            category_id: CategoryId::new(category_id),
            discount: 20.0,
            start_date: "2026-08-01".to_string(),
            end_date: "2026-08-31".to_string(),
            status: OfferStatus::Active,
        }
    }

    fn merchant(id: &str, business_name: &str) -> Merchant {
        Merchant {
            id: MerchantId::new(id),
            email: Email::parse("shop@example.net").expect("valid email"),
            username: "shop".to_string(),
            business_name: business_name.to_string(),
            contact_name: "Sam Lee".to_string(),
            business_type: "Food & Beverage".to_string(),
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_join_resolves_names() {
        let offers = vec![offer("o1", "m1", "c1")];
        let merchants = vec![merchant("m1", "Corner Bakery")];
        let categories = vec![category("c1", "Dining")];

        let details = join_offer_details(&offers, &merchants, &categories);

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].merchant_name, "Corner Bakery");
        assert_eq!(details[0].category_name, "Dining");
    }

    #[test]
    fn test_join_dangling_merchant_falls_back() {
        let offers = vec![offer("o1", "m-gone", "c1")];
        let merchants = vec![merchant("m1", "Corner Bakery")];
        let categories = vec![category("c1", "Dining")];

        let details = join_offer_details(&offers, &merchants, &categories);

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].merchant_name, UNKNOWN_MERCHANT);
        assert_eq!(details[0].category_name, "Dining");
    }

    #[test]
    fn test_join_dangling_category_falls_back() {
        let offers = vec![offer("o1", "m1", "c-gone")];
        let merchants = vec![merchant("m1", "Corner Bakery")];
        let categories = vec![category("c1", "Dining")];

        let details = join_offer_details(&offers, &merchants, &categories);

        assert_eq!(details[0].category_name, UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_join_empty_directories_keeps_every_row() {
        let offers = vec![offer("o1", "m1", "c1"), offer("o2", "m2", "c2")];

        let details = join_offer_details(&offers, &[], &[]);

        assert_eq!(details.len(), 2);
        assert!(
            details
                .iter()
                .all(|d| d.merchant_name == UNKNOWN_MERCHANT && d.category_name == UNKNOWN_CATEGORY)
        );
    }

    #[test]
    fn test_join_no_offers() {
        let details = join_offer_details(&[], &[merchant("m1", "Corner Bakery")], &[]);
        assert!(details.is_empty());
    }
}
