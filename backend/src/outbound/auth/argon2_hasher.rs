//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are PHC strings with a fresh 16-byte salt each. Unknown logins are
//! checked against a hash computed at construction so they cost the same as
//! a real verification. Every key derivation runs on Tokio's blocking pool.

use std::sync::Arc;

use argon2::password_hash::{self, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use rand::RngCore;
use tracing::debug;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash};

const SALT_LEN: usize = 16;
const DUMMY_PASSWORD: &[u8] = b"artmarket-dummy-password";

/// Argon2id password hasher.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl Argon2PasswordHasher {
    /// Hasher with the library's recommended Argon2id parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError::Hashing`] when the dummy hash cannot be
    /// computed.
    pub fn new() -> Result<Self, PasswordHasherError> {
        Self::with_params(Params::default())
    }

    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError::Hashing`] when the dummy hash cannot be
    /// computed.
    pub fn with_params(params: Params) -> Result<Self, PasswordHasherError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;
        Ok(Self {
            argon2,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// Low-cost parameters for tests and local fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHasherError::Hashing`] when the parameters are
    /// rejected.
    pub fn fast_for_tests() -> Result<Self, PasswordHasherError> {
        let params = Params::new(1024, 1, 1, None)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Self::with_params(params)
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &[u8]) -> Result<String, PasswordHasherError> {
    let mut salt = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)
        .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
    argon2
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordHasherError::hashing(err.to_string()))
}

fn verify_with(
    argon2: &Argon2<'_>,
    password: &[u8],
    phc: &str,
) -> Result<bool, PasswordHasherError> {
    let parsed = password_hash::PasswordHash::new(phc)
        .map_err(|err| PasswordHasherError::malformed_hash(err.to_string()))?;
    match argon2.verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHasherError::hashing(err.to_string())),
    }
}

/// Run a key-derivation job on the blocking pool.
async fn run_blocking<T, F>(job: F) -> Result<T, PasswordHasherError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| PasswordHasherError::hashing(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let argon2 = self.argon2.clone();
        let password = password.clone();
        run_blocking(move || hash_with(&argon2, password.expose().as_bytes()))
            .await
            .map(PasswordHash::from_phc)
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let argon2 = self.argon2.clone();
        let password = password.clone();
        let phc = hash.as_str().to_owned();
        run_blocking(move || verify_with(&argon2, password.expose().as_bytes(), &phc)).await
    }

    async fn verify_dummy(&self, password: &Password) {
        let argon2 = self.argon2.clone();
        let password = password.clone();
        let phc = Arc::clone(&self.dummy_hash);
        let outcome =
            run_blocking(move || verify_with(&argon2, password.expose().as_bytes(), &phc)).await;
        if let Err(err) = outcome {
            debug!(error = %err, "dummy password verification failed");
        }
    }
}
