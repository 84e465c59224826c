//! Argon2id password hashing, verification, and strength validation.
//!
//! Hashes use the Argon2id variant with a random salt drawn from [`OsRng`] and
//! are stored in PHC string format, so the algorithm, cost parameters, and
//! salt travel with the digest. Legacy bcrypt hashes (`$2a$`, `$2b$`, `$2x$`,
//! `$2y$`) are still accepted by [`PasswordHasher::verify_password`] and are
//! reported by [`PasswordHasher::needs_rehash`] so callers can upgrade them
//! after a successful login.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use gatekey_core::error::{AuthError, AuthResult};

/// PHC identifier of the algorithm new hashes are produced with.
const ARGON2ID: &str = "argon2id";

/// Prefixes of the modular-crypt bcrypt variants.
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Cost range bcrypt accepts.
const BCRYPT_COSTS: std::ops::RangeInclusive<u32> = 4..=31;

/// Argon2 work factor.
///
/// Raising any of these makes every hash (and every brute-force guess)
/// proportionally more expensive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory size in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Argon2id password hasher with a fixed work factor.
///
/// Cheap to clone and safe to share between threads.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    cost: HashCost,
}

impl PasswordHasher {
    /// Hasher with the default Argon2id cost parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
            cost: HashCost::default(),
        }
    }

    /// Hasher with a custom work factor.
    ///
    /// Fails with [`AuthError::Config`] if the parameters are outside the
    /// ranges Argon2 accepts (e.g. memory below `8 * parallelism` KiB).
    pub fn with_cost(cost: HashCost) -> AuthResult<Self> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::Config(format!("invalid Argon2 cost parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// Returns the PHC-formatted hash string. Two calls with the same
    /// password produce different strings; both verify.
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        if password.is_empty() {
            return Err(AuthError::Validation("Password must not be empty".into()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                AuthError::Hashing(e.to_string())
            })?;

        Ok(hash.to_string())
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(true)` on a match and `Ok(false)` on a mismatch. A stored
    /// hash that cannot be parsed, or that names an unsupported scheme, is
    /// [`AuthError::MalformedHash`] so it is never mistaken for a wrong
    /// password.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> AuthResult<bool> {
        if is_bcrypt(stored_hash) {
            return verify_bcrypt(password, stored_hash);
        }

        let parsed = parse_phc(stored_hash)?;
        let verified = match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => true,
            Err(HashError::Password) => false,
            Err(
                e @ (HashError::Algorithm
                | HashError::Version
                | HashError::ParamNameInvalid
                | HashError::ParamNameDuplicated
                | HashError::ParamsMaxExceeded
                | HashError::ParamValueInvalid(_)
                | HashError::SaltInvalid(_)
                | HashError::OutputSize { .. }
                | HashError::B64Encoding(_)),
            ) => {
                tracing::warn!(error = %e, algorithm = %parsed.algorithm, "Unusable password hash");
                return Err(AuthError::MalformedHash(e.to_string()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Password verification failed");
                return Err(AuthError::Hashing(e.to_string()));
            }
        };

        tracing::debug!(verified, "Password verification completed");
        Ok(verified)
    }

    /// Whether a stored hash should be replaced by a fresh one from this hasher.
    ///
    /// True for bcrypt hashes, for Argon2 variants other than Argon2id, and
    /// for Argon2id hashes whose cost parameters differ from [`Self::cost`].
    pub fn needs_rehash(&self, stored_hash: &str) -> AuthResult<bool> {
        if is_bcrypt(stored_hash) {
            check_bcrypt_format(stored_hash)?;
            return Ok(true);
        }

        let parsed = parse_phc(stored_hash)?;
        if parsed.algorithm.as_str() != ARGON2ID {
            return Ok(true);
        }

        let params =
            Params::try_from(&parsed).map_err(|e| AuthError::MalformedHash(e.to_string()))?;

        Ok(params.m_cost() != self.cost.memory_kib
            || params.t_cost() != self.cost.iterations
            || params.p_cost() != self.cost.parallelism)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("algorithm", &ARGON2ID)
            .field("cost", &self.cost)
            .finish()
    }
}

/// Validate that a password meets minimum strength requirements.
///
/// Currently enforces a minimum character length.
pub fn validate_password_strength(password: &str, min_length: usize) -> AuthResult<()> {
    if password.chars().count() < min_length {
        return Err(AuthError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Parses a PHC string and requires both the salt and the digest fields.
fn parse_phc(stored_hash: &str) -> AuthResult<PasswordHash<'_>> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        tracing::warn!(error = %e, "Invalid password hash format");
        AuthError::MalformedHash(e.to_string())
    })?;

    if parsed.salt.is_none() || parsed.hash.is_none() {
        tracing::warn!(algorithm = %parsed.algorithm, "Password hash is missing its salt or digest");
        return Err(AuthError::MalformedHash(
            "password hash is missing its salt or digest".into(),
        ));
    }

    Ok(parsed)
}

fn is_bcrypt(stored_hash: &str) -> bool {
    BCRYPT_PREFIXES
        .iter()
        .any(|prefix| stored_hash.starts_with(prefix))
}

fn verify_bcrypt(password: &str, stored_hash: &str) -> AuthResult<bool> {
    check_bcrypt_format(stored_hash)?;
    let verified = bcrypt::verify(password, stored_hash).map_err(|e| {
        tracing::warn!(error = %e, "Invalid bcrypt hash");
        AuthError::MalformedHash(e.to_string())
    })?;

    tracing::debug!(verified, scheme = "bcrypt", "Password verification completed");
    Ok(verified)
}

/// Checks the `$2b$NN$<salt><digest>` layout: a cost in bcrypt's range and
/// 53 characters of bcrypt's base64 alphabet.
fn check_bcrypt_format(stored_hash: &str) -> AuthResult<()> {
    let parts: Vec<&str> = stored_hash.split('$').collect();
    // "", "2b", "12", "<22-char salt><31-char digest>"
    let ["", _, cost, rest] = parts.as_slice() else {
        return Err(AuthError::MalformedHash("invalid bcrypt hash".into()));
    };

    let cost: u32 = cost
        .parse()
        .map_err(|_| AuthError::MalformedHash(format!("invalid bcrypt cost: {cost}")))?;
    if !BCRYPT_COSTS.contains(&cost) {
        return Err(AuthError::MalformedHash(format!(
            "bcrypt cost out of range: {cost}"
        )));
    }

    let valid_body = rest.len() == 53
        && rest
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'/');
    if !valid_body {
        return Err(AuthError::MalformedHash(
            "invalid bcrypt salt or digest".into(),
        ));
    }

    Ok(())
}
