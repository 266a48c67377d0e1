//! Feature modules. Each one has a `controller` with the leaf handlers, a
//! `service` with its store trait and PostgreSQL implementation, and a
//! `router` that registers its routes on the [`App`](crate::web::App).

pub mod health;
pub mod products;
pub mod users;
