//! End-to-end tests for the public `gatekey_auth` API.
//!
//! Tokens are decoded with a plain `jsonwebtoken` verifier, the way an
//! external consumer would, rather than through [`TokenSigner`] helpers.

use std::collections::HashMap;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use gatekey_auth::{
    AuthError, Claims, HashCost, PasswordHasher, SigningConfig, TokenSigner, TokenType,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

const ACCESS_SECRET: &str = "integration-access-secret";
const REFRESH_SECRET: &str = "integration-refresh-secret";

/// Allowed drift between issuance inside the library and `Utc::now()` here.
const TOLERANCE_SECS: i64 = 2;

fn signer() -> TokenSigner {
    let config = SigningConfig::new(ACCESS_SECRET, REFRESH_SECRET).expect("valid secrets");
    TokenSigner::new(&config)
}

fn decode_with(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

fn assert_expires_in(claims: &Claims, expected: Duration) {
    let target = Utc::now().timestamp() + expected.num_seconds();
    assert!(
        (claims.exp - target).abs() <= TOLERANCE_SECS,
        "exp {} not within {TOLERANCE_SECS}s of {target}",
        claims.exp
    );
}

// ---------------------------------------------------------------------------
// Token issuance
// ---------------------------------------------------------------------------

/// Subject `user-42`, no override: access type, exact subject, now + 30 min.
#[test]
fn access_token_defaults_to_thirty_minutes() {
    let token = signer()
        .issue_access_token("user-42", None)
        .expect("issue access token");

    let claims = decode_with(&token, ACCESS_SECRET).expect("valid signature");
    assert_eq!(claims.sub, "user-42");
    assert_eq!(claims.token_type, TokenType::Access);
    assert_expires_in(&claims, Duration::minutes(30));
}

/// Subject `user-42`, override of 5 minutes: now + 5 min, not 30.
#[test]
fn access_token_honours_explicit_expiry() {
    let token = signer()
        .issue_access_token("user-42", Some(Duration::minutes(5)))
        .expect("issue access token");

    let claims = decode_with(&token, ACCESS_SECRET).expect("valid signature");
    assert_expires_in(&claims, Duration::minutes(5));
}

#[test]
fn refresh_token_defaults_to_seven_days() {
    let token = signer()
        .issue_refresh_token("user-42", None)
        .expect("issue refresh token");

    let claims = decode_with(&token, REFRESH_SECRET).expect("valid signature");
    assert_eq!(claims.token_type, TokenType::Refresh);
    assert_eq!(claims.sub, "user-42");
    assert_expires_in(&claims, Duration::days(7));
}

#[test]
fn payload_uses_flat_type_claim() {
    let token = signer()
        .issue_access_token("user-42", None)
        .expect("issue access token");

    let claims: serde_json::Value = decode::<serde_json::Value>(
        &token,
        &DecodingKey::from_secret(ACCESS_SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .expect("valid signature")
    .claims;

    assert_eq!(claims["type"], "access");
    assert_eq!(claims["sub"], "user-42");
    assert!(claims["exp"].is_i64());
}

#[test]
fn configured_lifetime_overrides_apply() {
    let config = SigningConfig::new(ACCESS_SECRET, REFRESH_SECRET)
        .and_then(|c| c.with_access_ttl(Duration::minutes(10)))
        .and_then(|c| c.with_refresh_ttl(Duration::days(1)))
        .expect("valid config");
    let signer = TokenSigner::new(&config);

    let access = signer.issue_access_token("u", None).expect("access");
    let refresh = signer.issue_refresh_token("u", None).expect("refresh");

    assert_expires_in(
        &decode_with(&access, ACCESS_SECRET).expect("access"),
        Duration::minutes(10),
    );
    assert_expires_in(
        &decode_with(&refresh, REFRESH_SECRET).expect("refresh"),
        Duration::days(1),
    );
}

// ---------------------------------------------------------------------------
// Secret separation
// ---------------------------------------------------------------------------

#[test]
fn access_token_fails_against_refresh_secret() {
    let token = signer().issue_access_token("user-1", None).expect("issue");
    assert!(
        decode_with(&token, REFRESH_SECRET).is_err(),
        "access token must not verify with the refresh secret"
    );
}

#[test]
fn refresh_token_fails_against_access_secret() {
    let token = signer().issue_refresh_token("user-1", None).expect("issue");
    assert!(
        decode_with(&token, ACCESS_SECRET).is_err(),
        "refresh token must not verify with the access secret"
    );
}

#[test]
fn tampered_payload_is_rejected() {
    let signer = signer();
    let token = signer.issue_access_token("user-1", None).expect("issue");
    let other = signer.issue_access_token("user-2", None).expect("issue");

    // Splice user-2's payload under user-1's signature.
    let parts: Vec<&str> = token.split('.').collect();
    let other_parts: Vec<&str> = other.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

    assert_matches!(
        signer.validate_access_token(&forged),
        Err(AuthError::InvalidToken(_))
    );
}

// ---------------------------------------------------------------------------
// Configuration failures
// ---------------------------------------------------------------------------

#[test]
fn unset_secret_fails_before_any_token_exists() {
    let env: HashMap<&str, &str> = HashMap::from([("JWT_SECRET_KEY", "only-access")]);
    let result = SigningConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
    assert_matches!(result, Err(AuthError::Config(_)));
}

#[test]
fn empty_secret_fails_before_any_token_exists() {
    let env: HashMap<&str, &str> =
        HashMap::from([("JWT_SECRET_KEY", ""), ("JWT_REFRESH_SECRET_KEY", "r")]);
    let result = SigningConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
    assert_matches!(result, Err(AuthError::Config(_)));
}

// ---------------------------------------------------------------------------
// Login flow
// ---------------------------------------------------------------------------

/// Register, log in, receive a pair, and exchange the refresh token.
#[test]
fn password_check_then_token_pair() {
    let hasher = PasswordHasher::with_cost(HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid cost");
    let signer = signer();

    let stored = hasher
        .hash_password("hunter2-but-longer")
        .expect("hash at registration");

    assert!(!hasher
        .verify_password("hunter3-but-longer", &stored)
        .expect("well-formed hash"));
    assert!(hasher
        .verify_password("hunter2-but-longer", &stored)
        .expect("well-formed hash"));

    let pair = signer.issue_token_pair("user-42").expect("pair");
    let refresh_claims = signer
        .validate_refresh_token(&pair.refresh_token)
        .expect("refresh token valid");

    let renewed = signer
        .issue_access_token(&refresh_claims.sub, None)
        .expect("renewed access token");
    let claims = signer.validate_access_token(&renewed).expect("valid");
    assert_eq!(claims.sub, "user-42");
}
