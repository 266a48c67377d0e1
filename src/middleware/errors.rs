use std::sync::Arc;

use axum::extract::Request;
use sales_core::AppError;
use tracing::{error, warn};

use crate::web::{Context, Handler, HandlerFuture, Middleware, ShutdownSignal, respond_error};

/// Answers every error returned by the inner chain.
///
/// Request errors are logged at warn, everything else at error with the full
/// cause chain. A shutdown error is answered with a generic 500 and then
/// forwarded to the server through the shutdown signal.
pub struct Errors {
    shutdown: ShutdownSignal,
}

impl Errors {
    pub fn new(shutdown: ShutdownSignal) -> Self {
        Self { shutdown }
    }
}

impl Middleware for Errors {
    fn name(&self) -> &'static str {
        "errors"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(ErrorsHandler {
            shutdown: self.shutdown.clone(),
            next,
        })
    }
}

struct ErrorsHandler {
    shutdown: ShutdownSignal,
    next: Arc<dyn Handler>,
}

impl Handler for ErrorsHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let err = match self.next.call(ctx, req).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            let trace_id = ctx
                .trace_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            match &err {
                AppError::Request { .. } => warn!(trace_id = %trace_id, error = %err, "Request error"),
                _ => error!(trace_id = %trace_id, error = %err, "Request failed"),
            }

            let response = respond_error(ctx, &err)?;

            if err.is_shutdown() {
                self.shutdown.signal(err.to_string());
            }

            Ok(response)
        })
    }
}
