//! Shared domain vocabulary for the `gatekey` crates.
//!
//! - [`error`] -- the [`AuthError`](error::AuthError) taxonomy.
//! - [`types`] -- token classes and timestamp aliases.

pub mod error;
pub mod types;
