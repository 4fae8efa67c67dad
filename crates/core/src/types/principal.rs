//! Principal kind: the two sides of the marketplace.

use serde::{Deserialize, Serialize};

/// The kind of an authenticated principal.
///
/// Exactly one kind is authenticated at a time per client. The session
/// layer stores the kind next to the principal's record id, so "signed in
/// as a user" and "signed in as a merchant" are structurally exclusive
/// states rather than two independently managed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Merchant,
}

impl PrincipalKind {
    /// The record-store collection backing this principal kind.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Merchant => "merchants",
        }
    }

    /// The login page for this principal kind, used by auth rejections.
    #[must_use]
    pub const fn login_path(self) -> &'static str {
        match self {
            Self::User => "/user/login",
            Self::Merchant => "/merchant/login",
        }
    }
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Merchant => write!(f, "merchant"),
        }
    }
}

impl std::str::FromStr for PrincipalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "merchant" => Ok(Self::Merchant),
            _ => Err(format!("invalid principal kind: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_names() {
        assert_eq!(PrincipalKind::User.collection(), "users");
        assert_eq!(PrincipalKind::Merchant.collection(), "merchants");
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for kind in [PrincipalKind::User, PrincipalKind::Merchant] {
            let s = kind.to_string();
            assert_eq!(s.parse::<PrincipalKind>().unwrap(), kind);
        }
        assert!("admin".parse::<PrincipalKind>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&PrincipalKind::Merchant).unwrap();
        assert_eq!(json, "\"merchant\"");
    }
}
