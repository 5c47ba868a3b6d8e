use std::sync::OnceLock;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::password_hash::{rand_core::OsRng, Error, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher};
use thiserror::Error as ThisError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least 8 characters")]
    TooShort,
    #[error("Password confirmation does not match")]
    ConfirmationMismatch,
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` for a wrong password; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

static UNKNOWN_ACCOUNT_HASH: OnceLock<String> = OnceLock::new();

#[cfg(test)]
pub(crate) static UNKNOWN_ACCOUNT_CHECKS: AtomicUsize = AtomicUsize::new(0);

fn unknown_account_hash() -> &'static str {
    UNKNOWN_ACCOUNT_HASH.get_or_init(|| {
        hash_password("no account matches this login").unwrap_or_default()
    })
}

/// Login path for an email with no account: runs the same argon2
/// verification a real account would get, against a fixed hash, and
/// always answers `false`.
pub fn verify_password_without_account(password: &str) -> bool {
    #[cfg(test)]
    UNKNOWN_ACCOUNT_CHECKS.fetch_add(1, Ordering::SeqCst);

    let _ = verify_password(password, unknown_account_hash());
    false
}

pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), PasswordPolicyError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort);
    }
    if password != confirmation {
        return Err(PasswordPolicyError::ConfirmationMismatch);
    }
    Ok(())
}
