//! Password hashing and verification
//!
//! Hashes are Argon2id in PHC string format, salted per password. Both
//! operations are CPU-bound; the async variants run them on tokio's blocking
//! pool so request handling on the executor threads is never stalled.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{PostboardError, Result};

/// Hash a plaintext password on the current thread.
pub fn hash_password_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PostboardError::StoreFailure(format!("Failed to hash password: {}", e)))
}

/// Check a plaintext password against a stored hash on the current thread.
///
/// A stored hash that cannot be parsed never matches.
pub fn verify_password_blocking(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Hash a password without blocking the async executor
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|e| PostboardError::StoreFailure(format!("Password hashing task failed: {}", e)))?
}

/// Verify a password without blocking the async executor
pub async fn verify_password(password: String, stored_hash: String) -> bool {
    match tokio::task::spawn_blocking(move || verify_password_blocking(&password, &stored_hash)).await {
        Ok(matched) => matched,
        Err(e) => {
            log::error!("Password verification task failed: {}", e);
            false
        }
    }
}
