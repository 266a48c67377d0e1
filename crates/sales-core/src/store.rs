//! Errors raised by persistence stores.

use std::fmt;

use crate::errors::AppError;

#[derive(Debug)]
pub enum StoreError {
    /// No row matched; carries the entity name.
    NotFound(&'static str),
    /// An identifier could not be parsed.
    InvalidId,
    /// The caller may not act on the entity.
    Forbidden,
    /// Credentials did not match a user.
    AuthenticationFailure,
    Other(anyhow::Error),
}

impl StoreError {
    /// Maps the failure onto the client-facing classification.
    pub fn into_app_error(self) -> AppError {
        match self {
            StoreError::NotFound(_) => AppError::not_found(self),
            StoreError::InvalidId => AppError::bad_request(self),
            StoreError::Forbidden => AppError::forbidden(self),
            StoreError::AuthenticationFailure => AppError::unauthorized(self),
            StoreError::Other(err) => AppError::internal(err),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(entity) => write!(f, "{} not found", entity),
            StoreError::InvalidId => write!(f, "ID is not in its proper form"),
            StoreError::Forbidden => write!(f, "attempted action is not allowed"),
            StoreError::AuthenticationFailure => write!(f, "authentication failed"),
            StoreError::Other(err) => write!(f, "{:#}", err),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_classification() {
        let cases = [
            (StoreError::NotFound("product"), StatusCode::NOT_FOUND, "product not found"),
            (StoreError::InvalidId, StatusCode::BAD_REQUEST, "ID is not in its proper form"),
            (StoreError::Forbidden, StatusCode::FORBIDDEN, "attempted action is not allowed"),
            (StoreError::AuthenticationFailure, StatusCode::UNAUTHORIZED, "authentication failed"),
        ];

        for (err, status, message) in cases {
            let app_error = err.into_app_error();
            assert_eq!(app_error.status(), status);
            assert_eq!(app_error.to_error_response().error, message);
        }
    }

    #[test]
    fn test_other_is_unclassified() {
        let err = StoreError::Other(anyhow::anyhow!("deadlock detected")).into_app_error();
        assert!(matches!(err, AppError::Unclassified(_)));
        assert_eq!(err.to_error_response().error, "Internal Server Error");
    }
}
