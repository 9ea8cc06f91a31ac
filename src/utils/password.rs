use anyhow::{Context, Result};

/// Cost used outside tests. Overridable through `BCRYPT_COST` for slow hosts.
fn bcrypt_cost() -> u32 {
    crate::config::env_or("BCRYPT_COST", bcrypt::DEFAULT_COST).clamp(4, 31)
}

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt_cost()).context("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}
