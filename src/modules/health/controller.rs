use std::sync::Arc;

use axum::{extract::Request, http::StatusCode};
use serde::Serialize;
use tracing::warn;

use crate::modules::health::service::StatusCheck;
use crate::web::{Context, HandlerFuture, respond};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

pub struct HealthController {
    db: Arc<dyn StatusCheck>,
}

impl HealthController {
    pub fn new(db: Arc<dyn StatusCheck>) -> Self {
        Self { db }
    }

    /// 200 when the database answers, 500 otherwise.
    pub fn health<'a>(&'a self, ctx: &'a mut Context, _req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            if let Err(err) = self.db.status_check().await {
                warn!(trace_id = ?ctx.trace_id(), error = %err, "Database status check failed");
                let health = Health {
                    status: "db not ready",
                };
                return respond(ctx, &health, StatusCode::INTERNAL_SERVER_ERROR);
            }

            respond(ctx, &Health { status: "ok" }, StatusCode::OK)
        })
    }
}
