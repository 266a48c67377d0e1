//! # Sales DB
//!
//! Database pool and utilities for the Sales API.
//!
//! This crate turns a [`DatabaseConfig`] into a PostgreSQL connection pool
//! using SQLx and provides the health probe used by `/v1/health`.
//!
//! # Example
//!
//! ```ignore
//! use sales_config::DatabaseConfig;
//! use sales_db::{init_db_pool, status_check};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sqlx::Error> {
//!     let pool = init_db_pool(&DatabaseConfig::from_env());
//!     status_check(&pool).await?;
//!     Ok(())
//! }
//! ```

use sales_config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use tracing::info;

/// Builds connection options from the configuration.
///
/// TLS is required unless explicitly disabled and every session runs in UTC.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let (host, port) = config.host_and_port();
    let ssl_mode = if config.disable_tls {
        PgSslMode::Disable
    } else {
        PgSslMode::Require
    };

    PgConnectOptions::new()
        .host(host)
        .port(port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name)
        .ssl_mode(ssl_mode)
        .options([("timezone", "UTC")])
}

/// Creates a PostgreSQL connection pool.
///
/// Connections are opened lazily on first use, so a database that is still
/// starting does not prevent the service from booting. Use [`status_check`]
/// to find out whether it is reachable.
pub fn init_db_pool(config: &DatabaseConfig) -> PgPool {
    info!(
        host = %config.host,
        database = %config.name,
        tls = !config.disable_tls,
        max_connections = config.max_connections,
        "Configuring database pool"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(connect_options(config))
}

/// Succeeds only when the database answers a trivial query.
pub async fn status_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT true")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
