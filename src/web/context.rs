use std::time::Instant;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use sales_auth::Claims;
use sales_core::AppError;
use uuid::Uuid;

/// State recorded for a single request.
#[derive(Debug, Clone)]
pub struct Values {
    pub trace_id: Uuid,
    /// Monotonic start, used for latency
    pub start: Instant,
    /// Wall-clock start, used as "now" by handlers
    pub now: DateTime<Utc>,
    /// Set by the responder once a response is written
    pub status_code: Option<StatusCode>,
    responses: u32,
}

impl Values {
    pub fn new() -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            start: Instant::now(),
            now: Utc::now(),
            status_code: None,
            responses: 0,
        }
    }

    /// Number of responses the responder has written for this request.
    pub fn responses(&self) -> u32 {
        self.responses
    }

    pub(crate) fn record_response(&mut self, status: StatusCode) {
        self.status_code = Some(status);
        self.responses += 1;
    }
}

impl Default for Values {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-request context threaded through every handler in a chain.
#[derive(Debug)]
pub struct Context {
    values: Option<Values>,
    claims: Option<Claims>,
}

impl Context {
    pub fn new(values: Values) -> Self {
        Self {
            values: Some(values),
            claims: None,
        }
    }

    /// A context without request values, for exercising the integrity checks.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn detached() -> Self {
        Self {
            values: None,
            claims: None,
        }
    }

    /// Request values. Their absence means the request bypassed the driver,
    /// which is treated as an integrity failure.
    pub fn values(&self) -> Result<&Values, AppError> {
        self.values.as_ref().ok_or_else(missing_values)
    }

    pub fn values_mut(&mut self) -> Result<&mut Values, AppError> {
        self.values.as_mut().ok_or_else(missing_values)
    }

    /// Trace id for log lines, when values are present.
    pub fn trace_id(&self) -> Option<Uuid> {
        self.values.as_ref().map(|values| values.trace_id)
    }

    /// Claims stored by the authenticate middleware.
    pub fn claims(&self) -> Result<&Claims, AppError> {
        self.claims.as_ref().ok_or_else(|| {
            AppError::internal(anyhow::anyhow!(
                "claims missing from context: authorize composed without/before authenticate"
            ))
        })
    }

    pub fn set_claims(&mut self, claims: Claims) {
        self.claims = Some(claims);
    }
}

fn missing_values() -> AppError {
    AppError::shutdown("web values missing from context")
}
