//! SaverSpot Core - Shared types library.
//!
//! This crate provides common types used across all SaverSpot components:
//! - `web` - The marketplace web application (users + merchants)
//! - `cli` - Command-line tools for seeding and health checks
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no record-store access. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, principal kinds,
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
