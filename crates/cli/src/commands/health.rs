//! Store health check command.

use tracing::info;

use saverspot_web::pocketbase::PocketBaseClient;

/// Check that the credential store answers its health endpoint.
///
/// # Errors
///
/// Returns an error if the store is unreachable or unhealthy.
pub async fn check() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let url = std::env::var("POCKETBASE_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8090".to_string());

    let store = PocketBaseClient::new(&url);
    store.health().await?;

    info!("Store at {url} is healthy");

    Ok(())
}
