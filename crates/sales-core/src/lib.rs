//! # Sales Core
//!
//! Core types shared by every Sales API crate:
//!
//! - [`errors`]: the classified [`AppError`] and the JSON error envelope
//! - [`password`]: bcrypt password hashing and verification
//! - [`store`]: failures raised by persistence stores
//!
//! # Example
//!
//! ```ignore
//! use sales_core::{AppError, hash_password, verify_password};
//!
//! let hash = hash_password("secure_password")?;
//! if !verify_password("secure_password", &hash)? {
//!     return Err(AppError::unauthorized(anyhow::anyhow!("authentication failed")));
//! }
//! ```

pub mod errors;
pub mod password;
pub mod store;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorResponse, FieldError};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use store::StoreError;
