//! Password hashing using Argon2id.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters for new hashes.
///
/// Existing hashes carry their own parameters in the PHC string, so changing
/// these does not invalidate stored passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordParams {
    /// Memory in KiB (default: 19456 = 19 MiB).
    pub memory_kib: u32,
    /// Time iterations (default: 2).
    pub iterations: u32,
    /// Parallelism degree (default: 1).
    pub parallelism: u32,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordParams {
    /// Cheapest parameters Argon2 accepts. For tests only.
    pub fn low_cost() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Argon2id implementation of [`notegraph_core::PasswordHasher`].
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    params: PasswordParams,
}

impl Argon2PasswordHasher {
    pub fn new(params: PasswordParams) -> Self {
        Self { params }
    }

    fn argon2(&self) -> CryptoResult<Argon2<'static>> {
        let params = Params::new(
            self.params.memory_kib,
            self.params.iterations,
            self.params.parallelism,
            None,
        )
        .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password into a PHC string with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> CryptoResult<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let salt =
            SaltString::encode_b64(&salt).map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC string.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable hash is an error.
    pub fn verify_password(&self, password: &str, hashed: &str) -> CryptoResult<bool> {
        let parsed =
            PasswordHash::new(hashed).map_err(|e| CryptoError::InvalidHash(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CryptoError::InvalidHash(e.to_string())),
        }
    }
}

impl notegraph_core::PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> notegraph_core::Result<String> {
        Ok(self.hash_password(password)?)
    }

    fn verify(&self, password: &str, hashed: &str) -> notegraph_core::Result<bool> {
        Ok(self.verify_password(password, hashed)?)
    }
}
