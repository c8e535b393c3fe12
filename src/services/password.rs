//! Argon2id password hashing.
//!
//! Hashing is CPU-bound, so async callers go through the `*_blocking` helpers
//! which move the work onto tokio's blocking pool.

use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};
use std::sync::Arc;
use tokio::task;

use crate::config::SecurityConfig;

#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Verified against when a login names an unknown user, so that path costs
    /// the same as a wrong password.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(config: &SecurityConfig) -> Result<Self> {
        let params = Params::new(
            config.argon2_memory_cost_kib,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = Arc::from(hasher.hash("storefront-dummy-password")?);
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes with a fresh random salt; equal inputs never produce equal output.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// Returns false for a wrong password and for anything that is not a PHC hash.
    #[must_use]
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };

        // Parameters come from the PHC string, not from `self.params`.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String> {
        let hasher = self.clone();
        task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .context("Password hashing task panicked")?
    }

    pub async fn verify_blocking(&self, plaintext: String, hashed: String) -> Result<bool> {
        let hasher = self.clone();
        task::spawn_blocking(move || hasher.verify(&plaintext, &hashed))
            .await
            .context("Password verification task panicked")
    }

    /// Burns one verification against the dummy hash.
    pub async fn verify_dummy(&self, plaintext: String) -> Result<()> {
        let dummy = self.dummy_hash.to_string();
        self.verify_blocking(plaintext, dummy).await.map(|_| ())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .finish_non_exhaustive()
    }
}
