//! Solid-OIDC plumbing: issuer discovery, authorization, token exchange,
//! and the pod document fetch.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use super::{PodError, pkce};

const DISCOVERY_PATH: &str = ".well-known/openid-configuration";
const POD_DOCUMENT_PATH: &str = "mastercard/mastercardtransactions/mastercard-data.json";
const SCOPES: &str = "openid webid";

/// Normalize a raw issuer string: force `https` and a trailing slash on the
/// path.
///
/// # Errors
///
/// Returns [`PodError::InvalidIssuer`] when the string is not a URL or
/// cannot carry the `https` scheme.
pub fn normalize_issuer(raw: &str) -> Result<Url, PodError> {
    let mut issuer = Url::parse(raw).map_err(|_| PodError::InvalidIssuer(raw.to_string()))?;
    if issuer.scheme() != "https" {
        issuer
            .set_scheme("https")
            .map_err(|()| PodError::InvalidIssuer(raw.to_string()))?;
    }
    if !issuer.path().ends_with('/') {
        let path = format!("{}/", issuer.path());
        issuer.set_path(&path);
    }
    Ok(issuer)
}

/// Derive the storage root from a web-id.
///
/// A web-id like `https://server1.sgpod.co/alice/profile/card#me` maps to
/// the storage root `https://server1.sgpod.co/alice/`. A web-id in any
/// other shape passes through unchanged; the document fetch then fails and
/// is logged downstream.
#[must_use]
pub fn storage_root_from_webid(web_id: &str) -> String {
    web_id.replacen("/profile/card#me", "/", 1)
}

/// Extract the web-id from an identity token.
///
/// Prefers the `webid` claim; falls back to `sub` when that is a URL.
/// Claims are read without signature verification: the token arrives
/// directly from the issuer's token endpoint over the code exchange we
/// initiated, not from the browser.
///
/// # Errors
///
/// Returns [`PodError::IdToken`] when the token cannot be decoded, or
/// [`PodError::MissingWebId`] when no usable claim is present.
pub fn web_id_from_id_token(id_token: &str) -> Result<String, PodError> {
    let mut segments = id_token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(PodError::IdToken("expected three JWT segments".to_string()));
    };

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| PodError::IdToken(format!("payload is not base64url: {e}")))?;
    let claims: serde_json::Value = serde_json::from_slice(&payload_bytes)
        .map_err(|e| PodError::IdToken(format!("payload is not JSON: {e}")))?;

    if let Some(web_id) = claims.get("webid").and_then(|v| v.as_str()) {
        return Ok(web_id.to_string());
    }

    if let Some(sub) = claims.get("sub").and_then(|v| v.as_str()) {
        if Url::parse(sub).is_ok() {
            return Ok(sub.to_string());
        }
    }

    Err(PodError::MissingWebId)
}

/// The slice of issuer metadata this flow needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMetadata {
    /// Where to send the shopper for authorization.
    pub authorization_endpoint: String,
    /// Where to exchange the code for tokens.
    pub token_endpoint: String,
}

/// Authorization URL with the PKCE parameters to store in the session.
pub struct AuthorizationRequest {
    /// Fully built authorization URL to redirect to.
    pub url: String,
    /// Random `state` parameter embedded in the URL.
    pub state: String,
    /// PKCE code verifier matching the challenge in the URL.
    pub code_verifier: String,
}

/// Token response from the issuer's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token for the storage fetch.
    pub access_token: String,
    /// Identity token carrying the web-id claims.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Token type, normally `Bearer` or `DPoP`.
    pub token_type: String,
    /// Lifetime in seconds, when the issuer reports one.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// The web-id asserted by the identity token.
    ///
    /// # Errors
    ///
    /// Returns [`PodError::MissingWebId`] when no identity token came back,
    /// plus the [`web_id_from_id_token`] failure modes.
    pub fn web_id(&self) -> Result<String, PodError> {
        let id_token = self.id_token.as_deref().ok_or(PodError::MissingWebId)?;
        web_id_from_id_token(id_token)
    }
}

/// Client for the issuer-facing half of the pod bridge.
///
/// The app identifies itself by its public base URL, the Solid convention
/// for clients without a pre-registered id.
#[derive(Clone)]
pub struct PodOidcClient {
    http: reqwest::Client,
    client_id: String,
    redirect_uri: String,
}

impl PodOidcClient {
    /// Create a client for an app served at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: base_url.to_string(),
            redirect_uri: format!("{base_url}/user/callback"),
        }
    }

    /// Fetch the issuer's OpenID Connect metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PodError::Discovery`] when the issuer answers with a
    /// non-success status or unusable metadata.
    #[instrument(skip(self), fields(issuer = %issuer))]
    pub async fn discover(&self, issuer: &Url) -> Result<ProviderMetadata, PodError> {
        let discovery_url = issuer
            .join(DISCOVERY_PATH)
            .map_err(|e| PodError::Discovery(format!("bad discovery URL: {e}")))?;

        let response = self.http.get(discovery_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PodError::Discovery(format!(
                "issuer answered {status} for {DISCOVERY_PATH}"
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| PodError::Discovery(format!("metadata is not usable: {e}")))
    }

    /// Build the authorization URL with fresh PKCE and state parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PodError::Discovery`] when the advertised authorization
    /// endpoint is not a URL.
    pub fn authorization_request(
        &self,
        metadata: &ProviderMetadata,
    ) -> Result<AuthorizationRequest, PodError> {
        let mut url = Url::parse(&metadata.authorization_endpoint).map_err(|e| {
            PodError::Discovery(format!("authorization endpoint is not a URL: {e}"))
        })?;

        let state = pkce::generate_state();
        let code_verifier = pkce::generate_code_verifier();
        let code_challenge = pkce::generate_code_challenge(&code_verifier);

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("state", &state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("scope", SCOPES);

        Ok(AuthorizationRequest {
            url: url.into(),
            state,
            code_verifier,
        })
    }

    /// Exchange an authorization code for tokens using PKCE.
    ///
    /// # Errors
    ///
    /// Returns [`PodError::TokenExchange`] when the issuer rejects the
    /// exchange.
    #[instrument(skip(self, code, code_verifier))]
    pub async fn exchange_code(
        &self,
        metadata: &ProviderMetadata,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, PodError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("client_id", self.client_id.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(&metadata.token_endpoint)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PodError::TokenExchange {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| PodError::TokenExchange {
                status: status.as_u16(),
                detail: format!("token response is not usable: {e}"),
            })
    }

    /// Fetch and parse the transaction document from the pod's storage.
    ///
    /// # Errors
    ///
    /// Returns [`PodError::Document`] when the storage answers with a
    /// non-success status or the body is not JSON.
    #[instrument(skip(self, access_token), fields(web_id = %web_id))]
    pub async fn fetch_document(
        &self,
        web_id: &str,
        access_token: &str,
    ) -> Result<serde_json::Value, PodError> {
        let root = storage_root_from_webid(web_id);
        let document_url = format!("{root}{POD_DOCUMENT_PATH}");

        let response = self
            .http
            .get(&document_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PodError::Document(format!("storage answered {status}")));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PodError::Document(format!("not JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_token_with_payload(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"ES256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    fn test_metadata() -> ProviderMetadata {
        ProviderMetadata {
            authorization_endpoint: "https://server1.sgpod.co/authorize".to_string(),
            token_endpoint: "https://server1.sgpod.co/token".to_string(),
        }
    }

    #[test]
    fn test_normalize_issuer_forces_https() {
        let issuer = normalize_issuer("http://server1.sgpod.co").expect("normalize");
        assert_eq!(issuer.as_str(), "https://server1.sgpod.co/");
    }

    #[test]
    fn test_normalize_issuer_appends_trailing_slash() {
        let issuer = normalize_issuer("https://pods.example.org/idp").expect("normalize");
        assert_eq!(issuer.as_str(), "https://pods.example.org/idp/");

        let already = normalize_issuer("https://pods.example.org/idp/").expect("normalize");
        assert_eq!(already.as_str(), "https://pods.example.org/idp/");
    }

    #[test]
    fn test_normalize_issuer_rejects_garbage() {
        assert!(matches!(
            normalize_issuer("not an issuer"),
            Err(PodError::InvalidIssuer(_))
        ));
    }

    #[test]
    fn test_storage_root_strips_profile_suffix() {
        let root = storage_root_from_webid("https://server1.sgpod.co/alice/profile/card#me");
        assert_eq!(root, "https://server1.sgpod.co/alice/");
    }

    #[test]
    fn test_storage_root_passes_unknown_shapes_through() {
        let root = storage_root_from_webid("https://server1.sgpod.co/alice/id");
        assert_eq!(root, "https://server1.sgpod.co/alice/id");
    }

    #[test]
    fn test_web_id_prefers_webid_claim() {
        let token = id_token_with_payload(
            r#"{"sub":"alice","webid":"https://server1.sgpod.co/alice/profile/card#me"}"#,
        );
        let web_id = web_id_from_id_token(&token).expect("web id");
        assert_eq!(web_id, "https://server1.sgpod.co/alice/profile/card#me");
    }

    #[test]
    fn test_web_id_falls_back_to_url_sub() {
        let token =
            id_token_with_payload(r#"{"sub":"https://server1.sgpod.co/alice/profile/card#me"}"#);
        let web_id = web_id_from_id_token(&token).expect("web id");
        assert_eq!(web_id, "https://server1.sgpod.co/alice/profile/card#me");
    }

    #[test]
    fn test_web_id_rejects_opaque_sub() {
        let token = id_token_with_payload(r#"{"sub":"user-1234"}"#);
        assert!(matches!(
            web_id_from_id_token(&token),
            Err(PodError::MissingWebId)
        ));
    }

    #[test]
    fn test_web_id_rejects_malformed_token() {
        assert!(matches!(
            web_id_from_id_token("only.two"),
            Err(PodError::IdToken(_))
        ));
    }

    #[test]
    fn test_token_response_without_id_token_has_no_web_id() {
        let token = TokenResponse {
            access_token: "at".to_string(),
            id_token: None,
            token_type: "Bearer".to_string(),
            expires_in: None,
        };
        assert!(matches!(token.web_id(), Err(PodError::MissingWebId)));
    }

    #[test]
    fn test_authorization_request_carries_pkce() {
        let client = PodOidcClient::new("https://saverspot.example.org");
        let request = client
            .authorization_request(&test_metadata())
            .expect("request");

        assert!(request.url.starts_with("https://server1.sgpod.co/authorize?"));
        assert!(request.url.contains("response_type=code"));
        assert!(request.url.contains("code_challenge="));
        assert!(request.url.contains("code_challenge_method=S256"));
        assert!(request.url.contains(&format!("state={}", request.state)));
        assert!(
            request
                .url
                .contains("redirect_uri=https%3A%2F%2Fsaverspot.example.org%2Fuser%2Fcallback")
        );
        assert!(!request.code_verifier.is_empty());
    }

    #[test]
    fn test_authorization_request_unique_per_call() {
        let client = PodOidcClient::new("https://saverspot.example.org");
        let first = client
            .authorization_request(&test_metadata())
            .expect("request");
        let second = client
            .authorization_request(&test_metadata())
            .expect("request");

        assert_ne!(first.state, second.state);
        assert_ne!(first.code_verifier, second.code_verifier);
    }
}
