use std::sync::Arc;

use axum::routing::MethodFilter;

use crate::modules::health::controller::HealthController;
use crate::state::AppState;
use crate::web::{App, Endpoint};

pub fn init_health_routes(app: &mut App, state: &AppState) {
    let controller = Arc::new(HealthController::new(state.health.clone()));

    app.handle(
        MethodFilter::GET,
        "/v1/health",
        Endpoint::new(controller, HealthController::health),
        vec![],
    );
}
