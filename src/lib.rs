//! # Sales API
//!
//! A REST service over products and their sales, built with Axum and
//! PostgreSQL. Requests are authenticated with RSA-signed tokens whose header
//! names the key (`kid`) that verifies them, so signing keys can rotate
//! without a redeploy.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── cli/              # sales-admin commands (migrate, seed, useradd, keygen)
//! ├── middleware/       # logger, errors, metrics, panics, authenticate, authorize
//! ├── modules/          # Feature modules
//! │   ├── health/      # Database status probe
//! │   ├── products/    # Products and sales
//! │   └── users/       # Token issuance
//! └── web/              # Handler chain, request context, responder, shutdown
//! ```
//!
//! Each feature module follows a consistent structure:
//!
//! - `controller.rs`: leaf handlers
//! - `service.rs`: store trait and PostgreSQL implementation
//! - `router.rs`: route registration with the route's middlewares
//!
//! ## Request pipeline
//!
//! Every route is composed into one handler chain. Global middlewares wrap
//! every route in a fixed order, then route middlewares, then the leaf:
//!
//! ```text
//! logger -> errors -> metrics -> panics -> [authenticate -> authorize] -> handler
//! ```
//!
//! Handlers return `Result<Response, AppError>`. Request errors reach the
//! client with their own message and status; anything else becomes a generic
//! 500. A shutdown error is answered and then stops the server.
//!
//! ## Routes
//!
//! | Method | Path | Access |
//! |--------|------|--------|
//! | GET | `/v1/health` | open |
//! | GET | `/v1/users/token` | Basic auth |
//! | GET | `/v1/products` | open |
//! | GET | `/v1/products/{id}` | token |
//! | POST | `/v1/products` | token |
//! | PUT | `/v1/products/{id}` | token, owner or admin |
//! | DELETE | `/v1/products/{id}` | token, admin |
//! | POST | `/v1/products/{id}/sales` | token, admin |
//! | GET | `/v1/products/{id}/sales` | token |
//!
//! The debug listener serves `/metrics` (Prometheus) and `/debug/vars`.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin sales-admin -- keygen --kid $(uuidgen)
//! cargo run --bin sales-admin -- migrate
//! cargo run --bin sales-admin -- seed
//! cargo run --bin sales-api
//! ```

pub mod cli;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod web;

// Re-export workspace crates for convenience
pub use sales_auth;
pub use sales_config;
pub use sales_core;
pub use sales_db;
pub use sales_models;
