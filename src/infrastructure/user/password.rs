//! Password hashing using Argon2

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::DomainError;

/// Trait for password hashing operations
///
/// Implementations produce self-describing PHC strings with the salt embedded.
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a hash
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2-based password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash on the blocking pool; Argon2 is deliberately slow
pub async fn hash_blocking<H: PasswordHasher + ?Sized + 'static>(
    hasher: Arc<H>,
    password: String,
) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| DomainError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Verify on the blocking pool
pub async fn verify_blocking<H: PasswordHasher + ?Sized + 'static>(
    hasher: Arc<H>,
    password: String,
    hash: String,
) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("Password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("s3cret-pass").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("s3cret-pass", &hash));
        assert!(!hasher.verify("wrong-pass1", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = Argon2Hasher::new();

        let hash1 = hasher.hash("s3cret-pass").unwrap();
        let hash2 = hasher.hash("s3cret-pass").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("s3cret-pass", &hash1));
        assert!(hasher.verify("s3cret-pass", &hash2));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = Argon2Hasher::new();

        assert!(!hasher.verify("password", "invalid_hash_format"));
        assert!(!hasher.verify("password", ""));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

        let hash = hash_blocking(hasher.clone(), "abc12345".to_string())
            .await
            .unwrap();

        assert!(verify_blocking(hasher.clone(), "abc12345".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_blocking(hasher, "nope12345".to_string(), hash)
            .await
            .unwrap());
    }
}
