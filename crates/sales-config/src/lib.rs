//! # Sales Config
//!
//! Configuration structures loaded from environment variables. Every variable
//! is prefixed with `SALES_` and has a development default.
//!
//! - [`web`]: listener addresses, timeouts and log directory
//! - [`database`]: PostgreSQL connection settings
//! - [`auth`]: signing key, key identifier, algorithm and token lifetime
//!
//! # Example
//!
//! ```ignore
//! use sales_config::{AuthConfig, DatabaseConfig, WebConfig};
//!
//! dotenvy::dotenv().ok();
//! let web = WebConfig::from_env();
//! let db = DatabaseConfig::from_env();
//! let auth = AuthConfig::from_env();
//! ```

pub mod auth;
pub mod database;
pub mod web;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use web::WebConfig;
