//! Classified application errors.
//!
//! Every handler and middleware in the request pipeline returns
//! `Result<_, AppError>`. The variant decides both what the client sees and
//! what the server does next:
//!
//! - [`AppError::Request`]: a client-caused condition. The client receives the
//!   error's own message, the attached status and any field-level errors.
//! - [`AppError::Shutdown`]: the service detected an integrity problem. The
//!   client receives a generic 500 and the server begins an orderly shutdown.
//! - [`AppError::Unclassified`]: anything else. The client receives a generic
//!   500; the full cause chain is only logged.
//!
//! Any error convertible into [`anyhow::Error`] becomes `Unclassified` through
//! `?`, so database and hashing faults never leak to clients by accident.

use std::fmt;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub error: String,
}

/// Uniform JSON error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

#[derive(Debug)]
pub enum AppError {
    Request {
        error: Error,
        status: StatusCode,
        fields: Vec<FieldError>,
    },
    Shutdown {
        message: String,
    },
    Unclassified(Error),
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::Request {
            error: err.into(),
            status,
            fields: Vec::new(),
        }
    }

    pub fn with_fields<E>(status: StatusCode, err: E, fields: Vec<FieldError>) -> Self
    where
        E: Into<Error>,
    {
        Self::Request {
            error: err.into(),
            status,
            fields,
        }
    }

    /// Builds a 400 carrying one entry per failed field.
    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    error: error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("{} failed '{}' validation", field, error.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        Self::with_fields(
            StatusCode::BAD_REQUEST,
            anyhow::anyhow!("field validation error"),
            fields,
        )
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNAUTHORIZED, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::FORBIDDEN, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::Unclassified(err.into())
    }

    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        matches!(self, Self::Shutdown { .. })
    }

    /// Status code the client receives for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Request { status, .. } => *status,
            Self::Shutdown { .. } | Self::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-visible body. Only request errors expose their message.
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Request { error, fields, .. } => ErrorResponse {
                error: error.to_string(),
                fields: (!fields.is_empty()).then(|| fields.clone()),
            },
            Self::Shutdown { .. } | Self::Unclassified(_) => ErrorResponse {
                error: generic_message(StatusCode::INTERNAL_SERVER_ERROR),
                fields: None,
            },
        }
    }
}

fn generic_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Internal Server Error")
        .to_string()
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { error, status, .. } => write!(f, "{} ({})", error, status.as_u16()),
            Self::Shutdown { message } => write!(f, "shutdown: {}", message),
            Self::Unclassified(error) => write!(f, "{:#}", error),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_response())).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}
