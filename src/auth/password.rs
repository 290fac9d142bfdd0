//! Password hashing and verification using Argon2id
//!
//! Digests are PHC strings, so the salt and parameters travel with the hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to hash password: {0}")]
pub struct PasswordError(String);

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError(e.to_string()))
}

/// Verify a password against a stored digest.
///
/// A digest that does not parse never authenticates.
pub fn verify_password(password: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        tracing::warn!("Stored password digest is malformed");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_different_salts() {
        let hash1 = hash_password("same-password").unwrap();
        let hash2 = hash_password("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("same-password", &hash1));
        assert!(verify_password("same-password", &hash2));
    }

    #[test]
    fn malformed_digest_never_verifies() {
        assert!(!verify_password("password", "not-a-valid-hash"));
        assert!(!verify_password("", ""));
    }
}
