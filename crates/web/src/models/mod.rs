//! Domain models for the marketplace.
//!
//! Record types mirror the credential store's collections; wire field names
//! follow the store schema (camelCase on auth collections, snake_case on
//! data collections). Session types carry only what handlers need between
//! requests.

pub mod merchant;
pub mod offer;
pub mod session;
pub mod user;
