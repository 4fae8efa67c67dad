//! Recommendation client for the Anthropic Messages API.
//!
//! One call per offers page load: the shopper's pod transaction history and
//! the current offer list go in, a ranked list of rewritten offers comes out.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::ClaudeConfig;
use crate::models::offer::OfferDetails;

use super::error::{ApiErrorResponse, RecommendationError};
use super::types::{ContentBlock, Message, MessagesRequest, MessagesResponse, Recommendation};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 512;

/// Client for offer recommendations.
///
/// Cheaply cloneable; the HTTP client and model name live behind an `Arc`.
#[derive(Clone)]
pub struct RecommendationClient {
    inner: Arc<RecommendationClientInner>,
}

struct RecommendationClientInner {
    client: reqwest::Client,
    model: String,
}

impl RecommendationClient {
    /// Create a new recommendation client.
    ///
    /// # Arguments
    ///
    /// * `config` - Claude API configuration containing API key and model
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &ClaudeConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(RecommendationClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    /// Pick the top offers for a shopper based on their transaction history.
    ///
    /// # Arguments
    ///
    /// * `transaction_history` - The shopper's pod transaction document
    /// * `offers` - The denormalized offer list to choose from
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, returns an error response,
    /// or replies with something that is not a recommendation list.
    #[instrument(
        skip(self, transaction_history, offers),
        fields(model = %self.inner.model, offer_count = offers.len())
    )]
    pub async fn recommend_offers(
        &self,
        transaction_history: &serde_json::Value,
        offers: &[OfferDetails],
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        let history_json = serde_json::to_string(transaction_history)
            .map_err(|e| RecommendationError::Parse(format!("serialize history: {e}")))?;
        let offers_json = serde_json::to_string(offers)
            .map_err(|e| RecommendationError::Parse(format!("serialize offers: {e}")))?;

        let request = MessagesRequest {
            model: self.inner.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: build_prompt(&history_json, &offers_json),
            }],
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(handle_error_status(status, response).await);
        }

        let body = response.text().await?;
        let response: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| RecommendationError::Parse(format!("Failed to parse response: {e}")))?;

        let text = response
            .content
            .into_iter()
            .map(|block| match block {
                ContentBlock::Text { text } => text,
            })
            .next()
            .ok_or_else(|| {
                RecommendationError::Malformed("no text content in reply".to_string())
            })?;

        let recommendations = parse_recommendations(&text)?;
        debug!(count = recommendations.len(), "Parsed offer recommendations");
        Ok(recommendations)
    }
}

/// Map an error status code to a `RecommendationError`.
async fn handle_error_status(
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> RecommendationError {
    // Check for rate limiting
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return RecommendationError::RateLimited(retry_after);
    }

    // Check for unauthorized
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return RecommendationError::Unauthorized("Invalid API key".to_string());
    }

    // Try to parse API error response
    match response.text().await {
        Ok(body) => {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                RecommendationError::Api {
                    error_type: api_error.error.error_type,
                    message: api_error.error.message,
                }
            } else {
                RecommendationError::Api {
                    error_type: "unknown".to_string(),
                    message: body,
                }
            }
        }
        Err(e) => RecommendationError::Http(e),
    }
}

/// Build the recommendation prompt.
///
/// Both arguments arrive pre-serialized as JSON strings.
fn build_prompt(transaction_history: &str, offers: &str) -> String {
    format!(
        "You're a Recommendation AI trained to choose the best offers for a user based on their transaction history. \n\
         Based on the transaction history:\n\
         {transaction_history}\n\
         \n\
         Choose the top 6 offers in: \n\
         {offers}\n\
         \n\
         Make the offerName more interesting and enticing based on the user's history.\n\
         \n\
         Output ONLY in JSON format with keys: offerName (string), merchant (string), expiryDate (dd-mm-yyyy).\n\
         Do not include the \\n and \\t characters in the output."
    )
}

/// Parse the model's reply into a recommendation list.
///
/// Accepts either a bare JSON array or an object wrapper whose first value
/// holds the array (the model alternates between the two shapes).
fn parse_recommendations(text: &str) -> Result<Vec<Recommendation>, RecommendationError> {
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| RecommendationError::Parse(format!("reply is not JSON: {e}")))?;

    let list = match parsed {
        serde_json::Value::Array(_) => parsed,
        serde_json::Value::Object(map) => map
            .into_iter()
            .next()
            .map(|(_, value)| value)
            .ok_or_else(|| RecommendationError::Malformed("reply object is empty".to_string()))?,
        other => {
            return Err(RecommendationError::Malformed(format!(
                "expected a JSON array, got: {other}"
            )));
        }
    };

    serde_json::from_value(list)
        .map_err(|e| RecommendationError::Malformed(format!("not a recommendation list: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_embeds_inputs() {
        let prompt = build_prompt(r#"{"transactions":[]}"#, r#"[{"merchant_name":"Corner"}]"#);

        assert!(prompt.contains(r#"{"transactions":[]}"#));
        assert!(prompt.contains(r#"[{"merchant_name":"Corner"}]"#));
        assert!(prompt.contains("top 6 offers"));
        assert!(prompt.contains("offerName (string), merchant (string), expiryDate (dd-mm-yyyy)"));
    }

    #[test]
    fn test_parse_recommendations_array() {
        let text = r#"[
            {"offerName": "20% Off Sourdough", "merchant": "Corner Bakery", "expiryDate": "31-08-2026"},
            {"offerName": "Free Coffee", "merchant": "Bean There", "expiryDate": "15-09-2026"}
        ]"#;

        let recs = parse_recommendations(text).expect("parse");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].merchant, "Corner Bakery");
    }

    #[test]
    fn test_parse_recommendations_object_wrapped() {
        let text = r#"{
            "recommendations": [
                {"offerName": "20% Off Sourdough", "merchant": "Corner Bakery", "expiryDate": "31-08-2026"}
            ]
        }"#;

        let recs = parse_recommendations(text).expect("parse");
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].offer_name, "20% Off Sourdough");
    }

    #[test]
    fn test_parse_recommendations_not_json() {
        let result = parse_recommendations("Here are your offers!");
        assert!(matches!(result, Err(RecommendationError::Parse(_))));
    }

    #[test]
    fn test_parse_recommendations_scalar_reply() {
        let result = parse_recommendations("42");
        assert!(matches!(result, Err(RecommendationError::Malformed(_))));
    }

    #[test]
    fn test_parse_recommendations_wrapped_non_list() {
        let result = parse_recommendations(r#"{"note": "no offers today"}"#);
        assert!(matches!(result, Err(RecommendationError::Malformed(_))));
    }

    #[test]
    fn test_recommendation_client_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<RecommendationClient>();
    }

    #[test]
    fn test_recommendation_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecommendationClient>();
    }
}
