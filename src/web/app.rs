use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    response::Response,
    routing::{MethodFilter, on},
};
use tracing::error;

use super::context::{Context, Values};
use super::handler::{Handler, Middleware, wrap_middleware};
use super::respond::fallback_internal_error;
use super::shutdown::ShutdownSignal;

struct RouteEntry {
    method: MethodFilter,
    path: String,
    middlewares: Vec<&'static str>,
    handler: Arc<dyn Handler>,
}

/// Route table with a fixed list of global middlewares.
///
/// Every registered route is composed once, at registration, into a single
/// handler chain: global middlewares outermost, then the route's own
/// middlewares, then the leaf.
pub struct App {
    router: Router,
    global: Vec<Arc<dyn Middleware>>,
    shutdown: ShutdownSignal,
    routes: Vec<RouteEntry>,
}

impl App {
    pub fn new(shutdown: ShutdownSignal, global: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            router: Router::new(),
            global,
            shutdown,
            routes: Vec::new(),
        }
    }

    pub fn handle(
        &mut self,
        method: MethodFilter,
        path: &str,
        handler: Arc<dyn Handler>,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> &mut Self {
        let chain = wrap_middleware(&self.global, wrap_middleware(&middlewares, handler));

        let names = self
            .global
            .iter()
            .chain(middlewares.iter())
            .map(|middleware| middleware.name())
            .collect();
        self.routes.push(RouteEntry {
            method,
            path: path.to_string(),
            middlewares: names,
            handler: chain.clone(),
        });

        let shutdown = self.shutdown.clone();
        let route = on(method, move |req: Request| {
            let chain = chain.clone();
            let shutdown = shutdown.clone();
            async move { drive(chain.as_ref(), Context::new(Values::new()), &shutdown, req).await }
        });
        self.router = std::mem::take(&mut self.router).route(path, route);

        self
    }

    /// Names of the middlewares wrapping a route, outermost first.
    pub fn middleware_order(&self, method: MethodFilter, path: &str) -> Option<Vec<&'static str>> {
        self.find(method, path).map(|entry| entry.middlewares.clone())
    }

    /// The composed chain registered for a route.
    pub fn route_handler(&self, method: MethodFilter, path: &str) -> Option<Arc<dyn Handler>> {
        self.find(method, path).map(|entry| entry.handler.clone())
    }

    pub fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    fn find(&self, method: MethodFilter, path: &str) -> Option<&RouteEntry> {
        self.routes
            .iter()
            .find(|entry| entry.method == method && entry.path == path)
    }
}

/// Runs one request through a composed chain.
///
/// Errors are normally answered inside the chain. Anything that still
/// escapes gets a generic 500 here, and a shutdown error additionally
/// signals the server to stop.
pub async fn drive(
    handler: &dyn Handler,
    mut ctx: Context,
    shutdown: &ShutdownSignal,
    req: Request,
) -> Response {
    match handler.call(&mut ctx, req).await {
        Ok(response) => response,
        Err(err) => {
            let trace_id = ctx
                .trace_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            error!(trace_id = %trace_id, error = %err, "Unhandled error escaped the middleware chain");

            if err.is_shutdown() {
                shutdown.signal(err.to_string());
            }

            fallback_internal_error()
        }
    }
}
