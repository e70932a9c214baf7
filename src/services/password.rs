//! Password hashing
//!
//! Argon2id with the argon2 crate's default parameters and a random salt per
//! hash, stored as PHC strings. Hashing is CPU-bound, so async callers go
//! through the `*_blocking` variants which run on tokio's blocking pool.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

fn argon2() -> Argon2<'static> {
    Argon2::default()
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {}", e))
}

/// A mismatch is `Ok(false)`; a malformed stored hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let stored =
        PasswordHash::new(hash).map_err(|e| anyhow!("Stored password hash is malformed: {}", e))?;
    match argon2().verify_password(password.as_bytes(), &stored) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("Password verification failed: {}", e)),
    }
}

pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task panicked")?
}

pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_and_salted() {
        let first = hash_password("admin123").unwrap();
        let second = hash_password("admin123").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify() {
        let hash = hash_password("admin123").unwrap();
        assert!(verify_password("admin123", &hash).unwrap());
        assert!(!verify_password("admin124", &hash).unwrap());
        assert!(verify_password("admin123", "plaintext").is_err());
    }

    #[tokio::test]
    async fn test_blocking_variants() {
        let hash = hash_password_blocking("bí mật".to_string()).await.unwrap();
        assert!(verify_password_blocking("bí mật".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("bi mat".to_string(), hash).await.unwrap());
    }
}
