//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are PHC strings, so parameters and salt travel with the hash and
//! older rows still verify after a parameter change. Hashing is CPU bound and
//! runs on the blocking pool.

use argon2::password_hash::{PasswordHash as PhcHash, SaltString};
use argon2::{
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version,
};
use async_trait::async_trait;
use tokio::task;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::{Password, PasswordHash, TraceId};

/// Memory cost in KiB.
const MEMORY_COST_KIB: u32 = 15_000;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id hasher running on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    fn argon2() -> Result<Argon2<'static>, PasswordHasherError> {
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
            .map_err(|error| PasswordHasherError::hash(error.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

async fn run_blocking<T, F>(work: F) -> Result<T, PasswordHasherError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
{
    let trace_id = TraceId::current();
    task::spawn_blocking(move || match trace_id {
        Some(id) => TraceId::sync_scope(id, work),
        None => work(),
    })
    .await
    .map_err(|error| PasswordHasherError::hash(format!("hashing task failed: {error}")))?
}

fn hash_blocking(password: &Password) -> Result<PasswordHash, PasswordHasherError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let phc = Argon2PasswordHasher::argon2()?
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|error| PasswordHasherError::hash(error.to_string()))?;
    Ok(PasswordHash::new(phc.to_string()))
}

fn verify_blocking(password: &Password, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
    let parsed = PhcHash::new(hash.as_str())
        .map_err(|error| PasswordHasherError::malformed_hash(error.to_string()))?;
    match Argon2::default().verify_password(password.expose().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(error) => Err(PasswordHasherError::malformed_hash(error.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError> {
        let password = password.clone();
        run_blocking(move || hash_blocking(&password)).await
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = password.clone();
        let hash = hash.clone();
        run_blocking(move || verify_blocking(&password, &hash)).await
    }
}
