use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Directory of `<kid>.pem` public keys accepted for verification
    pub keys_dir: String,
    /// PEM encoded private key used to sign new tokens
    pub private_key_file: String,
    /// Key identifier stamped into every token this instance signs
    pub key_id: String,
    /// Signing algorithm name, e.g. `RS256`
    pub algorithm: String,
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keys_dir: "private/keys".to_string(),
            private_key_file: "private/private.pem".to_string(),
            key_id: String::new(),
            algorithm: "RS256".to_string(),
            token_ttl: Duration::from_secs(3600), // 1 hour
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            keys_dir: env::var("SALES_AUTH_KEYS_DIR").unwrap_or(defaults.keys_dir),
            private_key_file: env::var("SALES_AUTH_PRIVATE_KEY_FILE")
                .unwrap_or(defaults.private_key_file),
            key_id: env::var("SALES_AUTH_KEY_ID").unwrap_or(defaults.key_id),
            algorithm: env::var("SALES_AUTH_ALGORITHM").unwrap_or(defaults.algorithm),
            token_ttl: env::var("SALES_AUTH_TOKEN_TTL")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.token_ttl),
        }
    }
}
