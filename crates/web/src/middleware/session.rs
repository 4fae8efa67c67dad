//! Session middleware configuration.
//!
//! Sets up in-memory sessions with a signed cookie using tower-sessions.
//! The cookie carries only the session id; principal data stays server-side.

use secrecy::ExposeSecret;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AppConfig;

/// Session cookie name.
///
/// Kept from the first-generation frontend, whose route guard keyed off a
/// cookie of this name; the guard still does.
pub const SESSION_COOKIE_NAME: &str = "pb_auth";

/// Session expiry time in seconds (72 hours).
const SESSION_EXPIRY_SECONDS: i64 = 72 * 60 * 60;

/// Create the session layer with an in-memory store and signed cookie.
///
/// The cookie is `Secure` only when the public base URL is https, so local
/// http development still gets a cookie.
#[must_use]
pub fn create_session_layer(config: &AppConfig) -> SessionManagerLayer<MemoryStore, SignedCookie> {
    let store = MemoryStore::default();

    let is_secure = config.base_url.starts_with("https://");

    // Config guarantees the secret is at least 32 bytes, which derive_from
    // requires.
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key)
}
