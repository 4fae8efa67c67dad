//! Business logic services for the web crate.
//!
//! # Services
//!
//! - `auth` - Account sign-up, sign-in, and record access against the store
//! - `offers` - Public offer catalog with cached merchant/category directories

pub mod auth;
pub mod offers;

pub use auth::{AuthError, AuthService};
pub use offers::OfferCatalog;
