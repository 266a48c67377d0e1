//! # Sales Models
//!
//! Domain models and DTOs for the Sales API.
//!
//! - [`products`]: products and the sales recorded against them
//! - [`users`]: user accounts and the new-user payload
//!
//! Input DTOs derive [`validator::Validate`]; the web layer turns failures into
//! field-level errors.

pub mod products;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use products::{NewProduct, NewSale, Product, Sale, UpdateProduct};
pub use users::{NewUser, User};
