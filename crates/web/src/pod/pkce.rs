//! PKCE and state parameters for the authorization code flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a random PKCE code verifier.
///
/// 48 random bytes, base64url-encoded to 64 characters (RFC 7636 allows
/// 43-128).
#[must_use]
pub fn generate_code_verifier() -> String {
    let random_bytes: [u8; 48] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Compute the S256 code challenge for a verifier:
/// `BASE64URL(SHA256(verifier))`.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random `state` parameter (16 bytes, base64url).
#[must_use]
pub fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_within_rfc_length_bounds() {
        let verifier = generate_code_verifier();
        assert!(verifier.len() >= 43 && verifier.len() <= 128);
    }

    #[test]
    fn test_verifier_is_url_safe() {
        let verifier = generate_code_verifier();
        assert!(
            verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_verifier_and_state_are_random() {
        assert_ne!(generate_code_verifier(), generate_code_verifier());
        assert_ne!(generate_state(), generate_state());
    }

    #[test]
    fn test_challenge_is_deterministic_per_verifier() {
        let verifier = generate_code_verifier();
        assert_eq!(
            generate_code_challenge(&verifier),
            generate_code_challenge(&verifier)
        );
        assert_ne!(
            generate_code_challenge("one verifier"),
            generate_code_challenge("another verifier")
        );
    }

    #[test]
    fn test_challenge_known_value() {
        // SHA256("test") base64url, from an independent implementation.
        assert_eq!(
            generate_code_challenge("test"),
            "n4bQgYhMfWWaL-qgxVrQFaO_TxsrC4Is0V1sFbDwCgg"
        );
    }
}
