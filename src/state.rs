use std::sync::Arc;

use anyhow::{Context as _, bail};
use chrono::Utc;
use sales_auth::Authenticator;
use sales_config::AuthConfig;
use sqlx::PgPool;

use crate::metrics::Metrics;
use crate::modules::health::service::StatusCheck;
use crate::modules::products::service::{PgProductStore, ProductStore};
use crate::modules::users::service::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator>,
    pub products: Arc<dyn ProductStore>,
    pub users: Arc<dyn UserStore>,
    pub health: Arc<dyn StatusCheck>,
    pub metrics: Arc<Metrics>,
    pub token_ttl: chrono::Duration,
}

/// Token lifetime as a signed duration. Rejects lifetimes that are zero or
/// would push a token's expiry past the representable date range.
pub fn token_ttl(auth_config: &AuthConfig) -> anyhow::Result<chrono::Duration> {
    let ttl = chrono::Duration::from_std(auth_config.token_ttl)
        .context("SALES_AUTH_TOKEN_TTL is out of range")?;
    if ttl <= chrono::Duration::zero() {
        bail!("SALES_AUTH_TOKEN_TTL must be positive");
    }
    Utc::now()
        .checked_add_signed(ttl)
        .context("SALES_AUTH_TOKEN_TTL is out of range")?;
    Ok(ttl)
}

pub fn init_app_state(
    db: PgPool,
    authenticator: Arc<Authenticator>,
    auth_config: &AuthConfig,
) -> anyhow::Result<AppState> {
    let token_ttl = token_ttl(auth_config)?;

    Ok(AppState {
        authenticator,
        products: Arc::new(PgProductStore::new(db.clone())),
        users: Arc::new(PgUserStore::new(db.clone())),
        health: Arc::new(db),
        metrics: Arc::new(Metrics::new()),
        token_ttl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(ttl: Duration) -> AuthConfig {
        AuthConfig {
            token_ttl: ttl,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_token_ttl_accepts_default() {
        let ttl = token_ttl(&AuthConfig::default()).unwrap();
        assert_eq!(ttl, chrono::Duration::hours(1));
    }

    #[test]
    fn test_token_ttl_rejects_zero() {
        let err = token_ttl(&config(Duration::ZERO)).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }

    #[test]
    fn test_token_ttl_rejects_unrepresentable_expiry() {
        // Fits a chrono::Duration but overflows any DateTime<Utc>.
        let err = token_ttl(&config(Duration::from_secs(200_000_000 * 86_400))).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = token_ttl(&config(Duration::MAX)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
