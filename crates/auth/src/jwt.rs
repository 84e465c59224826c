//! Access and refresh token issuance and validation.
//!
//! Both token classes are HS256-signed JWTs carrying a [`Claims`] payload.
//! Each class has its own secret, so a refresh token never validates as an
//! access token and vice versa. The `type` claim is checked as well, which
//! catches deployments that configure the same secret twice.

use std::fmt;

use chrono::{Duration, Utc};
use gatekey_core::error::{AuthError, AuthResult};
use gatekey_core::types::{TokenType, UnixTimestamp};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SigningConfig;

/// JWT claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the caller-supplied identity, carried verbatim.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: UnixTimestamp,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: UnixTimestamp,
    /// Unique token identifier (UUID v4) for revocation / audit.
    pub jti: String,
    /// Token class.
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

/// Access and refresh token issued together after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Signing and verification keys for one token class.
#[derive(Clone)]
struct ClassKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl: Duration,
}

impl ClassKeys {
    fn new(secret: &str, default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            default_ttl,
        }
    }
}

/// Issues and validates tokens for both classes.
///
/// Built once from a validated [`SigningConfig`]; holds no mutable state, so a
/// single instance can be shared (or cloned) across threads.
#[derive(Clone)]
pub struct TokenSigner {
    algorithm: Algorithm,
    access: ClassKeys,
    refresh: ClassKeys,
}

impl TokenSigner {
    pub fn new(config: &SigningConfig) -> Self {
        Self {
            algorithm: config.algorithm(),
            access: ClassKeys::new(config.access_secret(), config.access_ttl()),
            refresh: ClassKeys::new(config.refresh_secret(), config.refresh_ttl()),
        }
    }

    /// Issue an access token for `subject`.
    ///
    /// `expires_in` of `None` applies the configured default (30 minutes
    /// unless overridden). `Some` is used exactly as given: a zero or negative
    /// duration yields a token that is already expired.
    pub fn issue_access_token(
        &self,
        subject: &str,
        expires_in: Option<Duration>,
    ) -> AuthResult<String> {
        self.issue(TokenType::Access, subject, expires_in)
    }

    /// Issue a refresh token for `subject`.
    ///
    /// Same contract as [`issue_access_token`](Self::issue_access_token), but
    /// signed with the refresh secret and defaulting to 7 days.
    pub fn issue_refresh_token(
        &self,
        subject: &str,
        expires_in: Option<Duration>,
    ) -> AuthResult<String> {
        self.issue(TokenType::Refresh, subject, expires_in)
    }

    /// Issue an access/refresh pair with default lifetimes.
    pub fn issue_token_pair(&self, subject: &str) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject, None)?,
            refresh_token: self.issue_refresh_token(subject, None)?,
            token_type: "bearer".to_string(),
            expires_in: self.access.default_ttl.num_seconds(),
        })
    }

    /// Validate an access token and return its claims.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<Claims> {
        self.validate(TokenType::Access, token)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh_token(&self, token: &str) -> AuthResult<Claims> {
        self.validate(TokenType::Refresh, token)
    }

    fn keys(&self, token_type: TokenType) -> &ClassKeys {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    fn issue(
        &self,
        token_type: TokenType,
        subject: &str,
        expires_in: Option<Duration>,
    ) -> AuthResult<String> {
        let keys = self.keys(token_type);
        let ttl = expires_in.unwrap_or(keys.default_ttl);

        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Validation(format!("token lifetime out of range: {ttl}")))?;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &keys.encoding).map_err(|e| {
            tracing::error!(error = %e, %token_type, "Failed to sign token");
            AuthError::TokenEncoding(e.to_string())
        })?;

        tracing::debug!(
            sub = %claims.sub,
            %token_type,
            exp = claims.exp,
            jti = %claims.jti,
            "Issued token"
        );

        Ok(token)
    }

    fn validate(&self, expected: TokenType, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.keys(expected).decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?
            .claims;

        if claims.token_type != expected {
            tracing::warn!(
                sub = %claims.sub,
                %expected,
                found = %claims.token_type,
                "Token presented with the wrong type"
            );
            return Err(AuthError::TokenTypeMismatch {
                expected,
                found: claims.token_type,
            });
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access.default_ttl)
            .field("refresh_ttl", &self.refresh.default_ttl)
            .finish_non_exhaustive()
    }
}
