//! HTTP client for the `PocketBase` records API.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{StoreError, first_failing_field};

/// Page size used when draining a full list.
const PER_PAGE: u32 = 200;

/// Successful password-auth response: a store token plus the matched record.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse<T> {
    /// Token to replay on subsequent record calls for this principal.
    pub token: String,
    /// The authenticated record.
    pub record: T,
}

/// Error body returned by the store for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: serde_json::Map<String, serde_json::Value>,
}

/// One page of a list response. Unused envelope fields are left undeclared.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(rename = "totalPages")]
    total_pages: u32,
    items: Vec<T>,
}

/// Client for the `PocketBase` records API.
///
/// All record operations take an optional store token; pass the token issued
/// at sign-in for calls made on behalf of a signed-in principal, or `None`
/// for open endpoints like registration and public listings.
#[derive(Clone)]
pub struct PocketBaseClient {
    inner: Arc<PocketBaseClientInner>,
}

struct PocketBaseClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl PocketBaseClient {
    /// Create a new client for the store at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: Arc::new(PocketBaseClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Get the store base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────────

    /// Authenticate against an auth collection with identity and password.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidCredentials` when the store rejects the
    /// identity/password pair, without distinguishing which was wrong.
    pub async fn auth_with_password<T: DeserializeOwned>(
        &self,
        collection: &str,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse<T>, StoreError> {
        let url = format!(
            "{}/api/collections/{}/records/auth-with-password",
            self.inner.base_url, collection
        );

        let body = serde_json::json!({
            "identity": identity,
            "password": password,
        });

        let response = self.inner.client.post(&url).json(&body).send().await?;

        // The store answers 400 for any bad identity/password pair; collapse
        // that to one generic error so callers cannot leak which part failed.
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(StoreError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(read_error(collection, response).await);
        }

        Ok(response.json().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a record in `collection`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the store rejects a field, with
    /// the highest-priority failing field picked out of the error payload.
    pub async fn create<T, B>(
        &self,
        collection: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!(
            "{}/api/collections/{}/records",
            self.inner.base_url, collection
        );

        let response = self
            .request(reqwest::Method::POST, &url, token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(collection, response).await);
        }

        Ok(response.json().await?)
    }

    /// Fetch a single record by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has that id or the token
    /// is not allowed to see it.
    pub async fn get_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<T, StoreError> {
        let url = format!(
            "{}/api/collections/{}/records/{}",
            self.inner.base_url,
            collection,
            urlencoding::encode(id)
        );

        let response = self
            .request(reqwest::Method::GET, &url, token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(collection, response).await);
        }

        Ok(response.json().await?)
    }

    /// Update fields of a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the store rejects a field, or
    /// `StoreError::NotFound` if no record has that id.
    pub async fn update<T, B>(
        &self,
        collection: &str,
        id: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!(
            "{}/api/collections/{}/records/{}",
            self.inner.base_url,
            collection,
            urlencoding::encode(id)
        );

        let response = self
            .request(reqwest::Method::PATCH, &url, token)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(collection, response).await);
        }

        Ok(response.json().await?)
    }

    /// Delete a record by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has that id.
    pub async fn delete(
        &self,
        collection: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<(), StoreError> {
        let url = format!(
            "{}/api/collections/{}/records/{}",
            self.inner.base_url,
            collection,
            urlencoding::encode(id)
        );

        let response = self
            .request(reqwest::Method::DELETE, &url, token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(collection, response).await);
        }

        Ok(())
    }

    /// Fetch every record in `collection`, optionally filtered.
    ///
    /// Pages through the list endpoint until the last page is drained, so
    /// callers never see a truncated result.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    pub async fn get_full_list<T: DeserializeOwned>(
        &self,
        collection: &str,
        filter: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<T>, StoreError> {
        let mut records = Vec::new();
        let mut page = 1u32;

        loop {
            let mut url = format!(
                "{}/api/collections/{}/records?page={page}&perPage={PER_PAGE}",
                self.inner.base_url, collection
            );
            if let Some(filter) = filter {
                url.push_str("&filter=");
                url.push_str(&urlencoding::encode(filter));
            }

            let response = self
                .request(reqwest::Method::GET, &url, token)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(read_error(collection, response).await);
            }

            let list: ListResponse<T> = response.json().await?;
            records.extend(list.items);

            if page >= list.total_pages {
                break;
            }
            page += 1;
        }

        Ok(records)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Health
    // ─────────────────────────────────────────────────────────────────────────

    /// Check that the store is reachable and answering.
    ///
    /// # Errors
    ///
    /// Returns an error if the health endpoint is unreachable or non-2xx.
    pub async fn health(&self) -> Result<(), StoreError> {
        let url = format!("{}/api/health", self.inner.base_url);

        let response = self.inner.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Api {
                status: response.status().as_u16(),
                message: "health check failed".to_string(),
            });
        }

        Ok(())
    }

    /// Start a request with the optional store token attached.
    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self.inner.client.request(method, url);
        if let Some(token) = token {
            builder = builder.header("Authorization", token);
        }
        builder
    }
}

/// Build a filter expression matching records whose `field` relation points
/// at the record with `id`.
///
/// Quotes and backslashes in the id are escaped so it cannot break out of the
/// string literal.
#[must_use]
pub fn relation_filter(field: &str, id: &str) -> String {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    format!(r#"{field}.id="{escaped}""#)
}

/// Map a non-2xx store response onto a `StoreError`.
async fn read_error(collection: &str, response: reqwest::Response) -> StoreError {
    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return StoreError::NotFound(collection.to_string());
    }

    let body = response.text().await.unwrap_or_default();

    if status == reqwest::StatusCode::BAD_REQUEST
        && let Ok(error_body) = serde_json::from_str::<ErrorBody>(&body)
        && let Some((field, message)) = first_failing_field(&error_body.data)
    {
        return StoreError::Validation { field, message };
    }

    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|parsed| parsed.message)
        .unwrap_or(body);

    StoreError::Api {
        status: status.as_u16(),
        message,
    }
}
