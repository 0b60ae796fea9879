//! Credential checks: input validation and bcrypt password hashes.

use super::types::AccountError;
use crate::core::constants::{
    PASSWORD_HASH_COST, PASSWORD_MIN_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};

pub fn validate_username(username: &str) -> Result<(), AccountError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN || len > USERNAME_MAX_LEN {
        return Err(AccountError::Validation(format!(
            "Username must be {} to {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AccountError::Validation(
            "Username can only contain letters, numbers, hyphens, and underscores".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AccountError> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AccountError::Validation(
            "Please enter a valid email address".to_string(),
        )),
    }
}

pub fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(AccountError::Validation(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    Ok(())
}

/// bcrypt hash with a fresh salt embedded in the result.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
}

/// False for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}
