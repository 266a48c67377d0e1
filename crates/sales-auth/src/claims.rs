//! Claims carried inside every signed token.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Role granted full control over products and sales.
pub const ROLE_ADMIN: &str = "ADMIN";
/// Role granted to every regular account.
pub const ROLE_USER: &str = "USER";

/// Signed token payload.
///
/// Timestamps are unix seconds, matching the registered `iat` and `exp`
/// claim names so standard validators understand them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity of the authenticated user
    pub sub: String,
    /// Roles granted to the subject
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiry timestamp
    pub exp: i64,
}

impl Claims {
    /// Builds claims valid from `now` for `ttl`.
    ///
    /// Fails when `ttl` does not move the expiry past the issue time or
    /// pushes it past the representable date range.
    pub fn new<I, S>(
        subject: impl Into<String>,
        roles: I,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let iat = now.timestamp();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| {
                AuthError::InvalidClaims(format!("token lifetime {} is out of range", ttl))
            })?
            .timestamp();
        if exp <= iat {
            return Err(AuthError::InvalidClaims(
                "expiry must be after the issue time".to_string(),
            ));
        }

        Ok(Self {
            sub: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            iat,
            exp,
        })
    }

    /// True when the subject holds at least one of `roles`.
    pub fn has_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.roles.contains(*role))
    }
}
