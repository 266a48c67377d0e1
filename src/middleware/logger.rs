use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, MatchedPath, Request};
use tracing::{error, info, warn};

use crate::web::{Context, Handler, HandlerFuture, Middleware};

/// Logs one line per request once the inner chain has finished.
pub struct Logger;

impl Middleware for Logger {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(LoggerHandler { next })
    }
}

struct LoggerHandler {
    next: Arc<dyn Handler>,
}

impl Handler for LoggerHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let (trace_id, start) = {
                let values = ctx.values()?;
                (values.trace_id, values.start)
            };

            let method = req.method().clone();
            let path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|| req.uri().path().to_string());
            let remote_addr = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
                .unwrap_or_else(|| "-".to_string());

            let result = self.next.call(ctx, req).await;

            let latency_ms = start.elapsed().as_millis();
            let status = ctx.values().ok().and_then(|values| values.status_code);

            match status.map(|status| status.as_u16()) {
                Some(status @ 400..=499) => warn!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    status,
                    latency_ms = %latency_ms,
                    "Client error"
                ),
                Some(status @ 500..=599) => error!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    status,
                    latency_ms = %latency_ms,
                    "Server error"
                ),
                Some(status) => info!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    status,
                    latency_ms = %latency_ms,
                    "Request completed"
                ),
                None => error!(
                    trace_id = %trace_id,
                    method = %method,
                    path = %path,
                    remote_addr = %remote_addr,
                    latency_ms = %latency_ms,
                    "Request finished without a response"
                ),
            }

            result
        })
    }
}
