use std::sync::Arc;

use axum::routing::MethodFilter;

use crate::modules::users::controller::UserController;
use crate::state::AppState;
use crate::web::{App, Endpoint};

pub fn init_users_routes(app: &mut App, state: &AppState) {
    let controller = Arc::new(UserController::new(
        state.users.clone(),
        state.authenticator.clone(),
        state.token_ttl,
    ));

    app.handle(
        MethodFilter::GET,
        "/v1/users/token",
        Endpoint::new(controller, UserController::token),
        vec![],
    );
}
