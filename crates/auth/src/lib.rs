//! Password hashing and JWT issuance for an authentication layer.
//!
//! - [`config`] -- signing secrets, algorithm, and default token lifetimes.
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access/refresh token issuance and validation.
//!
//! Build a [`SigningConfig`] once at startup, wrap it in a [`TokenSigner`],
//! and share both read-only:
//!
//! ```no_run
//! use gatekey_auth::{PasswordHasher, SigningConfig, TokenSigner};
//!
//! # fn main() -> Result<(), gatekey_core::error::AuthError> {
//! let config = SigningConfig::load()?;
//! let signer = TokenSigner::new(&config);
//! let hasher = PasswordHasher::new();
//!
//! let stored = hasher.hash_password("correct-horse-battery-staple")?;
//! if hasher.verify_password("correct-horse-battery-staple", &stored)? {
//!     let access = signer.issue_access_token("user-42", None)?;
//!     println!("{access}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod jwt;
pub mod password;

pub use config::SigningConfig;
pub use gatekey_core::error::{AuthError, AuthResult};
pub use gatekey_core::types::TokenType;
pub use jwt::{Claims, TokenPair, TokenSigner};
pub use password::{HashCost, PasswordHasher};
