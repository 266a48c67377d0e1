//! # Sales Auth
//!
//! Asymmetric token authentication for the Sales API.
//!
//! - [`claims`]: token payload and role constants
//! - [`authenticator`]: signing and verification with kid-based key lookup
//! - [`keys`]: key lookups, the rotating [`KeyRing`] and RSA key generation
//! - [`error`]: failure categories raised by this crate

pub mod authenticator;
pub mod claims;
pub mod error;
pub mod keys;

// Re-export commonly used types at crate root
pub use authenticator::{Authenticator, AuthenticatorBuilder};
pub use claims::{Claims, ROLE_ADMIN, ROLE_USER};
pub use error::AuthError;
pub use keys::{KeyLookup, KeyPair, KeyRing, SimpleKeyLookup, generate_rsa_key_pair};
