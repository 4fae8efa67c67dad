//! Types for the recommendation calls.
//!
//! The request and response shapes match the Anthropic Messages API; the
//! `Recommendation` shape matches the JSON the model is instructed to emit.

use serde::{Deserialize, Serialize};

/// A ranked offer recommendation, as emitted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Offer headline, rewritten by the model to fit the shopper.
    #[serde(rename = "offerName")]
    pub offer_name: String,
    /// Business name of the offering merchant.
    pub merchant: String,
    /// Expiry date in `dd-mm-yyyy` form.
    #[serde(rename = "expiryDate")]
    pub expiry_date: String,
}

/// Request body for the Messages API.
#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    /// Model to use.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation messages.
    pub messages: Vec<Message>,
}

/// A message in the request.
#[derive(Debug, Serialize)]
pub struct Message {
    /// The role of the message sender ("user" or "assistant").
    pub role: String,
    /// Plain text content of the message.
    pub content: String,
}

/// Response from the Messages API.
#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    /// Response content blocks.
    pub content: Vec<ContentBlock>,
}

/// Content block in a response.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
}
