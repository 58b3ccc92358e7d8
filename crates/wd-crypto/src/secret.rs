//! Client secret hashing.
//!
//! Secrets are stored as Argon2id PHC strings and compared in constant time.
//! Hashing is CPU-bound: async callers should run it on a blocking thread.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use wd_core::HasherConfig;

use crate::error::{CryptoError, CryptoResult};

/// Hashes and verifies client secrets.
pub trait SecretHasher: Send + Sync {
    /// Hashes a secret for storage.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Hash`] if hashing fails.
    fn hash(&self, secret: &[u8]) -> CryptoResult<String>;

    /// Compares a candidate secret against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SecretMismatch`] if the secret does not match
    /// and [`CryptoError::Hash`] if the stored hash cannot be parsed.
    fn compare(&self, hashed: &str, candidate: &[u8]) -> CryptoResult<()>;
}

/// Argon2id secret hasher.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl Argon2Hasher {
    /// Output hash length in bytes.
    pub const HASH_LENGTH: usize = 32;

    /// Creates a hasher from configured costs.
    #[must_use]
    pub const fn new(config: &HasherConfig) -> Self {
        Self {
            memory_cost: config.memory_cost,
            time_cost: config.time_cost,
            parallelism: config.parallelism,
        }
    }

    fn argon2(&self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(Self::HASH_LENGTH),
        )
        .map_err(|e| CryptoError::Hash(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(&HasherConfig::default())
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &[u8]) -> CryptoResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()?
            .hash_password(secret, &salt)
            .map_err(|e| CryptoError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    fn compare(&self, hashed: &str, candidate: &[u8]) -> CryptoResult<()> {
        let parsed = PasswordHash::new(hashed).map_err(|e| CryptoError::Hash(e.to_string()))?;

        // Parameters are read from the PHC string, so older hashes still verify
        Argon2::default()
            .verify_password(candidate, &parsed)
            .map_err(|_| CryptoError::SecretMismatch)
    }
}
