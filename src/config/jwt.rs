use anyhow::Result;
use std::env;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: u64,
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable must be set"))?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters",
                MIN_SECRET_LEN
            ));
        }

        let access_token_expiry = super::env_or("JWT_ACCESS_EXPIRATION", 3600); // 1 hour
        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "tradeconnect".to_string());

        Ok(Self {
            secret,
            access_token_expiry,
            issuer,
        })
    }
}
