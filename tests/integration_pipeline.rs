mod common;

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::extract::Request as AxumRequest;
use axum::http::{Request, StatusCode, header};
use axum::routing::MethodFilter;
use common::{TestApp, bearer, json_body, send};
use http_body_util::BodyExt;
use sales_api::metrics::Metrics;
use sales_api::middleware;
use sales_api::web::{
    App, Context, Endpoint, Handler, HandlerFuture, Middleware, drive, respond, shutdown,
};
use sales_core::AppError;

/// Leaf handlers that misbehave on purpose.
struct Faulty {
    calls: AtomicUsize,
}

impl Faulty {
    fn panic<'a>(&'a self, ctx: &'a mut Context, _req: AxumRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst);
            let inventory: Vec<u32> = Vec::new();
            let stock = inventory[calls + 3];
            respond(ctx, &stock, StatusCode::OK)
        })
    }

    fn integrity<'a>(&'a self, _ctx: &'a mut Context, _req: AxumRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::shutdown("ledger totals diverged"))
        })
    }

    fn missing<'a>(&'a self, _ctx: &'a mut Context, _req: AxumRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::not_found(anyhow::anyhow!("product not found")))
        })
    }

    fn ok<'a>(&'a self, ctx: &'a mut Context, _req: AxumRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            respond(ctx, &serde_json::json!({ "ok": true }), StatusCode::OK)
        })
    }
}

/// Records, per request path, how many responses the responder wrote.
#[derive(Clone, Default)]
struct ResponseCount {
    seen: Arc<Mutex<Vec<(String, u32)>>>,
}

struct ResponseCountHandler {
    seen: Arc<Mutex<Vec<(String, u32)>>>,
    next: Arc<dyn Handler>,
}

impl Middleware for ResponseCount {
    fn name(&self) -> &'static str {
        "response_count"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(ResponseCountHandler {
            seen: self.seen.clone(),
            next,
        })
    }
}

impl Handler for ResponseCountHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: AxumRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            let path = req.uri().path().to_string();
            let result = self.next.call(ctx, req).await;
            let responses = ctx.values()?.responses();
            self.seen.lock().unwrap().push((path, responses));
            result
        })
    }
}

fn faulty_app(
    metrics: Arc<Metrics>,
) -> (axum::Router, shutdown::ShutdownReceiver, Arc<Faulty>) {
    faulty_app_with(Vec::new(), metrics)
}

fn faulty_app_with(
    outer: Vec<Arc<dyn Middleware>>,
    metrics: Arc<Metrics>,
) -> (axum::Router, shutdown::ShutdownReceiver, Arc<Faulty>) {
    let (signal, receiver) = shutdown::channel();
    let faulty = Arc::new(Faulty {
        calls: AtomicUsize::new(0),
    });

    let mut global = outer;
    global.extend(middleware::global(signal.clone(), metrics));

    let mut app = App::new(signal, global);
    app.handle(
        MethodFilter::GET,
        "/panic",
        Endpoint::new(faulty.clone(), Faulty::panic),
        vec![],
    )
    .handle(
        MethodFilter::GET,
        "/integrity",
        Endpoint::new(faulty.clone(), Faulty::integrity),
        vec![],
    )
    .handle(
        MethodFilter::GET,
        "/missing",
        Endpoint::new(faulty.clone(), Faulty::missing),
        vec![],
    )
    .handle(
        MethodFilter::GET,
        "/ok",
        Endpoint::new(faulty.clone(), Faulty::ok),
        vec![],
    );

    (app.into_router(), receiver, faulty)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_panic_becomes_generic_500_and_server_keeps_serving() {
    let metrics = Arc::new(Metrics::new());
    let (router, mut shutdown, faulty) = faulty_app(metrics.clone());

    let response = send(&router, get("/panic")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Internal Server Error");
    assert!(body.get("fields").is_none());

    let response = send(&router, get("/ok")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["ok"], true);

    assert_eq!(faulty.calls.load(Ordering::SeqCst), 2);
    assert!(shutdown.try_recv().is_none());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.requests, 2);
    assert_eq!(snapshot.errors, 1);
    assert_eq!(snapshot.in_flight, 0);
}

#[tokio::test]
async fn test_exactly_one_response_per_request() {
    let counter = ResponseCount::default();
    let (router, mut shutdown, faulty) =
        faulty_app_with(vec![Arc::new(counter.clone())], Arc::new(Metrics::new()));

    let cases = [
        ("/ok", StatusCode::OK),
        ("/missing", StatusCode::NOT_FOUND),
        ("/integrity", StatusCode::INTERNAL_SERVER_ERROR),
        ("/panic", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (path, status) in cases {
        let response = send(&router, get(path)).await;
        assert_eq!(response.status(), status, "{}", path);
    }

    let seen = counter.seen.lock().unwrap().clone();
    let expected: Vec<(String, u32)> = cases
        .iter()
        .map(|(path, _)| (path.to_string(), 1))
        .collect();
    assert_eq!(seen, expected);
    assert_eq!(faulty.calls.load(Ordering::SeqCst), 4);

    // Only the integrity failure asks the server to stop.
    assert!(shutdown.try_recv().is_some());
    assert!(shutdown.try_recv().is_none());
}

#[tokio::test]
async fn test_integrity_error_answers_then_requests_shutdown_once() {
    let (router, mut shutdown, _faulty) = faulty_app(Arc::new(Metrics::new()));

    let response = send(&router, get("/integrity")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal Server Error");

    let request = shutdown.try_recv().unwrap();
    assert!(request.reason.contains("ledger totals diverged"));
    assert!(shutdown.try_recv().is_none());
}

#[tokio::test]
async fn test_detached_context_is_an_integrity_failure() {
    let test = TestApp::new().await;
    let (app, mut shutdown) = test.app();
    let chain = app.route_handler(MethodFilter::GET, "/v1/health").unwrap();

    let response = drive(
        chain.as_ref(),
        Context::detached(),
        app.shutdown_signal(),
        get("/v1/health"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error"], "Internal Server Error");

    let request = shutdown.try_recv().unwrap();
    assert!(request.reason.contains("web values missing from context"));
    assert!(shutdown.try_recv().is_none());
}

#[tokio::test]
async fn test_route_middleware_order() {
    let test = TestApp::new().await;
    let (app, _shutdown) = test.app();

    assert_eq!(
        app.middleware_order(MethodFilter::GET, "/v1/products").unwrap(),
        vec!["logger", "errors", "metrics", "panics"]
    );
    assert_eq!(
        app.middleware_order(MethodFilter::GET, "/v1/products/{id}").unwrap(),
        vec!["logger", "errors", "metrics", "panics", "authenticate"]
    );
    assert_eq!(
        app.middleware_order(MethodFilter::DELETE, "/v1/products/{id}").unwrap(),
        vec!["logger", "errors", "metrics", "panics", "authenticate", "authorize"]
    );
    assert!(app.middleware_order(MethodFilter::PATCH, "/v1/products/{id}").is_none());
}

#[tokio::test]
async fn test_errors_are_counted_by_request_metrics() {
    let test = TestApp::new().await;
    let (router, _shutdown) = test.router();

    send(&router, get("/v1/products")).await;
    let response = send(&router, get(&format!("/v1/products/{}", uuid::Uuid::new_v4()))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let snapshot = test.state.metrics.snapshot();
    assert_eq!(snapshot.requests, 2);
    assert_eq!(snapshot.errors, 1);
    assert_eq!(snapshot.in_flight, 0);
}

#[tokio::test]
async fn test_no_content_has_empty_body() {
    let test = TestApp::new().await;
    let product = test.seed_product(&test.admin, "Comic Books").await;
    let (router, _shutdown) = test.router();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/v1/products/{}", product.id))
        .header(header::AUTHORIZATION, bearer(&test.admin_token()))
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert!(body.is_empty());
}
