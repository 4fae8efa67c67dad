//! Integration tests for `SaverSpot`.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no external services)
//! cargo test -p saverspot-integration-tests
//!
//! # Live scenario tests (require a running server and store)
//! cargo run -p saverspot-web &
//! cargo test -p saverspot-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `web_router` - In-process route guard, session, and API dispatch tests
//! - `live_scenario` - End-to-end flows against a running deployment
