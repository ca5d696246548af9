//! Password hashing delegation.
//!
//! The user contract and the repositories never touch a hashing algorithm
//! directly; they go through [`Hasher`] so tests can swap in a cheap backend
//! and applications can tune Argon2 costs via [`SecurityConfig`].

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::config::SecurityConfig;

/// Leading marker of an unusable password. Verification short-circuits to
/// false for any stored value starting with it.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

const UNUSABLE_PASSWORD_SUFFIX_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("invalid argon2 params: {0}")]
    Params(String),
}

/// Produces and verifies password hashes.
pub trait Hasher: Send + Sync {
    /// Hashes `raw`. `None` yields the unusable sentinel, a value no
    /// plaintext can ever verify against.
    fn make_password(&self, raw: Option<&str>) -> Result<String, HashError>;

    /// Checks `raw` against `hash`. A mismatch is `Ok(false)`; only a
    /// malformed hash is an error.
    fn verify_password(&self, raw: &str, hash: &str) -> Result<bool, HashError>;
}

/// Argon2id hasher, optionally tuned by a [`SecurityConfig`].
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    config: Option<SecurityConfig>,
}

impl Argon2Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self { config: None }
    }

    #[must_use]
    pub fn with_config(config: SecurityConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, HashError> {
        match &self.config {
            Some(cfg) => {
                let params = Params::new(
                    cfg.argon2_memory_cost_kib,
                    cfg.argon2_time_cost,
                    cfg.argon2_parallelism,
                    None,
                )
                .map_err(|e| HashError::Params(e.to_string()))?;
                Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
            }
            None => Ok(Argon2::default()),
        }
    }
}

impl Hasher for Argon2Hasher {
    fn make_password(&self, raw: Option<&str>) -> Result<String, HashError> {
        let Some(raw) = raw else {
            return Ok(unusable_password());
        };

        let salt = SaltString::generate(&mut OsRng);
        self.argon2()?
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::Hashing(e.to_string()))
    }

    fn verify_password(&self, raw: &str, hash: &str) -> Result<bool, HashError> {
        if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
            return Ok(false);
        }

        let parsed =
            PasswordHash::new(hash).map_err(|e| HashError::MalformedHash(e.to_string()))?;
        Ok(self
            .argon2()?
            .verify_password(raw.as_bytes(), &parsed)
            .is_ok())
    }
}

/// Sentinel stored for accounts without a settable credential. The random
/// suffix keeps two unusable accounts from sharing a stored value.
fn unusable_password() -> String {
    use rand::Rng;
    use std::fmt::Write;

    let mut rng = rand::rng();
    let bytes: [u8; UNUSABLE_PASSWORD_SUFFIX_LEN / 2] = rng.random();

    let mut out = String::with_capacity(UNUSABLE_PASSWORD_SUFFIX_LEN + 1);
    out.push(UNUSABLE_PASSWORD_PREFIX);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
