use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use confab_core::error::CoreError;

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Hashes a password using Argon2id with a random salt.
///
/// ## Errors
/// Returns an error if password hashing fails.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            ServiceError::from(CoreError::InvalidConfiguration(format!(
                "Failed to hash password: {e}"
            )))
        })?;

    Ok(password_hash.to_string())
}

/// ## Summary
/// Verifies a password against a stored Argon2 hash.
///
/// Returns `Ok(())` if the password matches the hash, or an error otherwise.
///
/// ## Errors
/// Returns an error if password verification fails or the hash format is invalid.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<()> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        ServiceError::from(CoreError::InvalidConfiguration(format!(
            "Invalid password hash: {e}"
        )))
    })?;

    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|err| {
            tracing::trace!("Password verification failed: {}", err);
            ServiceError::NotAuthenticated
        })
}
