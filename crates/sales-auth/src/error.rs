use std::fmt;

/// Failures raised while building an [`Authenticator`](crate::Authenticator)
/// or while issuing and verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The authenticator or a key source was configured incorrectly.
    Config(String),
    /// The signature operation failed.
    Signing(String),
    /// The token header is readable but lacks a usable key id.
    MalformedToken(String),
    /// No public key is registered for the key id in the token.
    UnknownKey(String),
    /// Signature, algorithm, expiry or structure checks failed.
    InvalidToken(String),
    /// Claims violate their own invariants.
    InvalidClaims(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Config(msg) => write!(f, "{}", msg),
            AuthError::Signing(msg) => write!(f, "signing token: {}", msg),
            AuthError::MalformedToken(msg) => write!(f, "{}", msg),
            AuthError::UnknownKey(msg) => write!(f, "unknown key: {}", msg),
            AuthError::InvalidToken(msg) => write!(f, "invalid token: {}", msg),
            AuthError::InvalidClaims(msg) => write!(f, "invalid claims: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}
