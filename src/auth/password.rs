use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::warn;

use crate::shared::AppError;

/// Hashes a password with argon2id and a fresh random salt.
///
/// The output is a self-describing PHC string carrying the salt and
/// parameters, so verification needs nothing beyond the stored value.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            warn!(error = %e, "failed to hash password");
            AppError::Internal
        })
}

/// Verifies a password against a stored PHC hash string.
///
/// Comparison inside argon2 is constant-time. A stored hash that fails to
/// parse is treated as a mismatch rather than an error.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
