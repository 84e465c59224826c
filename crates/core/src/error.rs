use crate::types::TokenType;

/// Errors raised by password hashing, signing configuration and token handling.
///
/// A password that simply does not match its stored hash is not an error;
/// verification reports that as `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Startup misconfiguration: a required secret is missing or empty, or a
    /// cost/lifetime parameter is out of range. Treat as fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input was rejected (e.g. an empty password).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A stored credential hash could not be parsed or names a scheme this
    /// crate cannot verify. Usually data corruption or a migration bug.
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),

    /// The hashing primitive failed unexpectedly.
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Claims could not be serialized or signed.
    #[error("Token encoding failed: {0}")]
    TokenEncoding(String),

    /// The token's `exp` claim lies in the past.
    #[error("Token has expired")]
    TokenExpired,

    /// Bad signature, malformed token, or unexpected algorithm.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// A token of one class was presented where the other was required.
    #[error("Token type mismatch: expected {expected}, found {found}")]
    TokenTypeMismatch {
        expected: TokenType,
        found: TokenType,
    },
}

/// Convenience alias used throughout the `gatekey` crates.
pub type AuthResult<T> = Result<T, AuthError>;
