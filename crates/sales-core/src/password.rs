//! One-way password hashing.
//!
//! Callers treat the hash as an opaque string: [`hash_password`] produces it,
//! [`verify_password`] compares a plaintext candidate against it.

use anyhow::Context;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Same as [`hash_password`] with an explicit bcrypt cost (4..=31).
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    let hashed = hash(password, cost).context("Failed to hash password")?;
    Ok(hashed)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let valid = verify(password, hash).context("Failed to verify password")?;
    Ok(valid)
}
