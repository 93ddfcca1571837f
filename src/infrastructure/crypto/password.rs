//! Password hashing with bcrypt

use crate::domain::{DomainError, DomainResult};

pub fn hash_password(password: &str) -> DomainResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| DomainError::Validation(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> DomainResult<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| DomainError::Validation(format!("Failed to verify password: {}", e)))
}
