//! Password hashing
//!
//! Argon2id with a random salt, stored as a PHC string. Hashing is CPU bound,
//! so the async entry points run it on the blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("password task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Hash a password on the current thread.
pub fn hash_password_blocking(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Check a password against a stored PHC string.
///
/// A stored value that is not a valid hash never matches.
pub fn verify_password_blocking(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "Stored password hash is malformed");
            false
        }
    }
}

pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password)).await?
}

pub async fn verify_password(password: String, stored: String) -> Result<bool, PasswordError> {
    let matched =
        tokio::task::spawn_blocking(move || verify_password_blocking(&password, &stored)).await?;
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password_blocking("Sunrise2024").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password_blocking("Sunrise2024", &hash));
        assert!(!verify_password_blocking("sunrise2024", &hash));
    }

    #[test]
    fn salts_differ() {
        let a = hash_password_blocking("12345678").unwrap();
        let b = hash_password_blocking("12345678").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password_blocking("anything", "not-a-hash"));
        assert!(!verify_password_blocking("", ""));
    }

    #[tokio::test]
    async fn async_entry_points() {
        let hash = hash_password("Moonlight7".to_string()).await.unwrap();
        assert!(verify_password("Moonlight7".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("moonlight7".to_string(), hash).await.unwrap());
    }
}
