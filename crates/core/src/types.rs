use std::fmt;

use serde::{Deserialize, Serialize};

/// Token timestamps are UTC Unix seconds, as carried in JWT `exp`/`iat`.
pub type UnixTimestamp = i64;

/// The class of a signed token. Each class is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token authorizing API access.
    Access,
    /// Long-lived token used to obtain new access tokens.
    Refresh,
}

impl TokenType {
    /// Wire name as it appears in the `type` claim.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_lowercase_string() {
        assert_eq!(
            serde_json::to_string(&TokenType::Access).expect("serialize"),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&TokenType::Refresh).expect("serialize"),
            "\"refresh\""
        );
    }

    #[test]
    fn rejects_unknown_type() {
        let result: Result<TokenType, _> = serde_json::from_str("\"session\"");
        assert!(result.is_err(), "unknown token class must not deserialize");
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(TokenType::Refresh.to_string(), "refresh");
        assert_eq!(TokenType::Access.as_str(), "access");
    }
}
