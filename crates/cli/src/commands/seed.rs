//! Seed the record store with demo data.
//!
//! Categories come from a built-in directory or a YAML list; offers are
//! generated against whatever categories the store already holds. Both
//! commands talk to the same `PocketBase` instance the web server uses.

use tracing::info;

use saverspot_core::OfferStatus;
use saverspot_web::models::offer::{Category, Offer};
use saverspot_web::pocketbase::{PocketBaseClient, collections};

/// Built-in demo category directory.
const DEMO_CATEGORIES: [&str; 5] = [
    "Fashion",
    "Electronics",
    "Home & Living",
    "Travel",
    "Food & Dining",
];

/// Demo discount percentages, cycled over the categories.
const DEMO_DISCOUNTS: [f64; 5] = [10.0, 15.0, 20.0, 25.0, 30.0];

/// Build a store client from `POCKETBASE_URL`, defaulting to a local
/// instance.
fn store_client() -> PocketBaseClient {
    dotenvy::dotenv().ok();

    let url = std::env::var("POCKETBASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());
    PocketBaseClient::new(&url)
}

/// Seed the category directory.
///
/// Names already present in the store are skipped, so the command can be
/// re-run safely.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the store rejects a
/// record.
pub async fn categories(file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let names: Vec<String> = match file {
        Some(path) => {
            info!(path, "Loading categories from file");
            let content = tokio::fs::read_to_string(path).await?;
            serde_yaml::from_str(&content)?
        }
        None => DEMO_CATEGORIES.iter().map(|&name| name.to_string()).collect(),
    };

    let store = store_client();
    let existing: Vec<Category> = store
        .get_full_list(collections::CATEGORY, None, None)
        .await?;

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    for name in names {
        if existing.iter().any(|category| category.name == name) {
            skipped += 1;
            continue;
        }

        let _: Category = store
            .create(
                collections::CATEGORY,
                &serde_json::json!({ "name": name }),
                None,
            )
            .await?;
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Categories inserted: {inserted}");
    info!("  Categories skipped (already exist): {skipped}");

    Ok(())
}

/// Seed demo offers for a merchant.
///
/// Creates one active offer per category in the store, valid from today for
/// thirty days.
///
/// # Errors
///
/// Returns an error if the store has no categories or rejects a record.
pub async fn offers(merchant_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = store_client();

    let categories: Vec<Category> = store
        .get_full_list(collections::CATEGORY, None, None)
        .await?;
    if categories.is_empty() {
        return Err("store has no categories; run `spot-cli seed categories` first".into());
    }

    let today = chrono::Utc::now().date_naive();
    let end = today + chrono::Days::new(30);

    let mut inserted = 0usize;
    for (category, discount) in categories.iter().zip(DEMO_DISCOUNTS.iter().cycle()) {
        let _: Offer = store
            .create(
                collections::OFFERS,
                &serde_json::json!({
                    "merchant_id": merchant_id,
                    "category_id": category.id.as_str(),
                    "discount": discount,
                    "start_date": today.to_string(),
                    "end_date": end.to_string(),
                    "status": OfferStatus::Active.to_string(),
                }),
                None,
            )
            .await?;
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Offers inserted: {inserted}");

    Ok(())
}
