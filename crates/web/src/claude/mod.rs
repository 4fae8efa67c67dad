//! Claude-backed offer recommendations.
//!
//! Sends the shopper's pod transaction history and the current offer list
//! to the Anthropic Messages API and parses the reply into a ranked list.
//! The feature is optional: without an API key the offers page renders the
//! plain catalog.

mod client;
mod error;
mod types;

pub use client::RecommendationClient;
pub use error::RecommendationError;
pub use types::Recommendation;
