//! Signing configuration for access and refresh tokens.
//!
//! The two HMAC secrets are read once from the environment at startup and are
//! immutable afterwards. A missing or empty secret is a fatal configuration
//! error: construction fails and no token can be issued.
//!
//! | Env Var                  | Required | Default |
//! |--------------------------|----------|---------|
//! | `JWT_SECRET_KEY`         | **yes**  | --      |
//! | `JWT_REFRESH_SECRET_KEY` | **yes**  | --      |

use std::fmt;

use chrono::Duration;
use gatekey_core::error::{AuthError, AuthResult};
use jsonwebtoken::Algorithm;

/// Signing algorithm for every issued token (HMAC-SHA256).
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Default access token lifetime in minutes.
pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;

/// Default refresh token lifetime in days.
pub const REFRESH_TOKEN_EXPIRE_DAYS: i64 = 7;

/// Environment variable holding the access token secret.
pub const JWT_SECRET_KEY_ENV: &str = "JWT_SECRET_KEY";

/// Environment variable holding the refresh token secret.
pub const JWT_REFRESH_SECRET_KEY_ENV: &str = "JWT_REFRESH_SECRET_KEY";

/// Secrets, algorithm, and default lifetimes used by [`TokenSigner`](crate::jwt::TokenSigner).
///
/// Fields are private: the only way to obtain a value is through a
/// constructor that has already checked both secrets are non-empty.
#[derive(Clone)]
pub struct SigningConfig {
    access_secret: String,
    refresh_secret: String,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SigningConfig {
    /// Build a configuration from explicit secrets with the default lifetimes.
    ///
    /// Fails with [`AuthError::Config`] if either secret is empty or blank.
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> AuthResult<Self> {
        let access_secret = require_secret(JWT_SECRET_KEY_ENV, access_secret.into())?;
        let refresh_secret = require_secret(JWT_REFRESH_SECRET_KEY_ENV, refresh_secret.into())?;

        if access_secret == refresh_secret {
            tracing::warn!(
                "{JWT_SECRET_KEY_ENV} and {JWT_REFRESH_SECRET_KEY_ENV} are identical; \
                 access and refresh tokens are interchangeable at the signature level"
            );
        }

        Ok(Self {
            access_secret,
            refresh_secret,
            algorithm: ALGORITHM,
            access_ttl: Duration::minutes(ACCESS_TOKEN_EXPIRE_MINUTES),
            refresh_ttl: Duration::days(REFRESH_TOKEN_EXPIRE_DAYS),
        })
    }

    /// Load the secrets from the process environment.
    pub fn from_env() -> AuthResult<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        tracing::info!(
            access_ttl_mins = config.access_ttl.num_minutes(),
            refresh_ttl_days = config.refresh_ttl.num_days(),
            "Loaded JWT signing configuration"
        );
        Ok(config)
    }

    /// Load a `.env` file if one is present, then read the environment.
    pub fn load() -> AuthResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Used by [`from_env`](Self::from_env); tests pass a closure over a
    /// fixed map so they never touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_secret = lookup(JWT_SECRET_KEY_ENV)
            .ok_or_else(|| AuthError::Config(format!("{JWT_SECRET_KEY_ENV} must be set")))?;
        let refresh_secret = lookup(JWT_REFRESH_SECRET_KEY_ENV).ok_or_else(|| {
            AuthError::Config(format!("{JWT_REFRESH_SECRET_KEY_ENV} must be set"))
        })?;

        Self::new(access_secret, refresh_secret)
    }

    /// Override the default access token lifetime. Must be positive.
    pub fn with_access_ttl(mut self, ttl: Duration) -> AuthResult<Self> {
        self.access_ttl = require_positive("access token lifetime", ttl)?;
        Ok(self)
    }

    /// Override the default refresh token lifetime. Must be positive.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> AuthResult<Self> {
        self.refresh_ttl = require_positive("refresh token lifetime", ttl)?;
        Ok(self)
    }

    /// HMAC secret for access tokens.
    pub(crate) fn access_secret(&self) -> &str {
        &self.access_secret
    }

    /// HMAC secret for refresh tokens.
    pub(crate) fn refresh_secret(&self) -> &str {
        &self.refresh_secret
    }

    /// Signing algorithm; always [`ALGORITHM`].
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Lifetime applied to access tokens issued without an explicit expiry.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Lifetime applied to refresh tokens issued without an explicit expiry.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

fn require_secret(name: &str, value: String) -> AuthResult<String> {
    if value.trim().is_empty() {
        return Err(AuthError::Config(format!("{name} must not be empty")));
    }
    Ok(value)
}

fn require_positive(what: &str, ttl: Duration) -> AuthResult<Duration> {
    if ttl <= Duration::zero() {
        return Err(AuthError::Config(format!("{what} must be positive")));
    }
    Ok(ttl)
}
