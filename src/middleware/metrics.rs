use std::sync::Arc;

use axum::extract::Request;

use crate::metrics::Metrics;
use crate::web::{Context, Handler, HandlerFuture, Middleware};

/// Counts requests and failures into the shared [`Metrics`].
pub struct RequestMetrics {
    metrics: Arc<Metrics>,
}

impl RequestMetrics {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

impl Middleware for RequestMetrics {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(RequestMetricsHandler {
            metrics: self.metrics.clone(),
            next,
        })
    }
}

struct RequestMetricsHandler {
    metrics: Arc<Metrics>,
    next: Arc<dyn Handler>,
}

impl Handler for RequestMetricsHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let in_flight = self.metrics.request_started();
            let result = self.next.call(ctx, req).await;
            if result.is_err() {
                self.metrics.request_failed();
            }
            drop(in_flight);
            result
        })
    }
}
