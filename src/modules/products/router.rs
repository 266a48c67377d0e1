use std::sync::Arc;

use axum::routing::MethodFilter;
use sales_auth::ROLE_ADMIN;

use crate::middleware::{Authenticate, Authorize};
use crate::modules::products::controller::ProductController;
use crate::state::AppState;
use crate::web::{App, Endpoint, Middleware};

pub fn init_products_routes(app: &mut App, state: &AppState) {
    let controller = Arc::new(ProductController::new(state.products.clone()));
    let authenticate: Arc<dyn Middleware> =
        Arc::new(Authenticate::new(state.authenticator.clone()));
    let admin_only: Arc<dyn Middleware> = Arc::new(Authorize::new(&[ROLE_ADMIN]));

    app.handle(
        MethodFilter::GET,
        "/v1/products",
        Endpoint::new(controller.clone(), ProductController::list),
        vec![],
    )
    .handle(
        MethodFilter::GET,
        "/v1/products/{id}",
        Endpoint::new(controller.clone(), ProductController::retrieve),
        vec![authenticate.clone()],
    )
    .handle(
        MethodFilter::POST,
        "/v1/products",
        Endpoint::new(controller.clone(), ProductController::create),
        vec![authenticate.clone()],
    )
    .handle(
        MethodFilter::PUT,
        "/v1/products/{id}",
        Endpoint::new(controller.clone(), ProductController::update),
        vec![authenticate.clone()],
    )
    .handle(
        MethodFilter::DELETE,
        "/v1/products/{id}",
        Endpoint::new(controller.clone(), ProductController::delete),
        vec![authenticate.clone(), admin_only.clone()],
    )
    .handle(
        MethodFilter::POST,
        "/v1/products/{id}/sales",
        Endpoint::new(controller.clone(), ProductController::add_sale),
        vec![authenticate.clone(), admin_only],
    )
    .handle(
        MethodFilter::GET,
        "/v1/products/{id}/sales",
        Endpoint::new(controller, ProductController::list_sales),
        vec![authenticate],
    );
}
