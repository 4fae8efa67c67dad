//! Application state shared across handlers.

use std::sync::Arc;

use crate::claude::RecommendationClient;
use crate::config::AppConfig;
use crate::pocketbase::PocketBaseClient;
use crate::pod::PodOidcClient;
use crate::services::offers::OfferCatalog;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the credential store client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pocketbase: PocketBaseClient,
    catalog: OfferCatalog,
    pod: PodOidcClient,
    recommendations: Option<RecommendationClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The recommendation client is only constructed when an Anthropic API
    /// key is configured; without one the feature is simply absent.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let pocketbase = PocketBaseClient::new(&config.pocketbase_url);
        let catalog = OfferCatalog::new(pocketbase.clone());
        let pod = PodOidcClient::new(&config.base_url);
        let recommendations = config.claude.as_ref().map(RecommendationClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pocketbase,
                catalog,
                pod,
                recommendations,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the credential store client.
    #[must_use]
    pub fn pocketbase(&self) -> &PocketBaseClient {
        &self.inner.pocketbase
    }

    /// Get a reference to the offer catalog.
    #[must_use]
    pub fn catalog(&self) -> &OfferCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the pod OIDC client.
    #[must_use]
    pub fn pod(&self) -> &PodOidcClient {
        &self.inner.pod
    }

    /// Get the recommendation client, if one is configured.
    #[must_use]
    pub fn recommendations(&self) -> Option<&RecommendationClient> {
        self.inner.recommendations.as_ref()
    }
}
