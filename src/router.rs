use std::time::Duration;

use axum::{Router, http::StatusCode};
use tower_http::timeout::TimeoutLayer;

use crate::middleware;
use crate::modules::health::router::init_health_routes;
use crate::modules::products::router::init_products_routes;
use crate::modules::users::router::init_users_routes;
use crate::state::AppState;
use crate::web::{App, ShutdownSignal};

/// Registers every route on a new [`App`].
pub fn build_app(state: &AppState, shutdown: ShutdownSignal) -> App {
    let global = middleware::global(shutdown.clone(), state.metrics.clone());
    let mut app = App::new(shutdown, global);

    init_health_routes(&mut app, state);
    init_users_routes(&mut app, state);
    init_products_routes(&mut app, state);

    app
}

pub fn init_router(state: &AppState, shutdown: ShutdownSignal, request_timeout: Duration) -> Router {
    build_app(state, shutdown)
        .into_router()
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}
