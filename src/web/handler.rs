use std::sync::Arc;

use axum::{extract::Request, response::Response};
use futures::future::BoxFuture;
use sales_core::AppError;

use super::context::Context;

pub type HandlerFuture<'a> = BoxFuture<'a, Result<Response, AppError>>;

/// One link in a request chain: a leaf business handler or a middleware
/// wrapper around the next link.
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a>;
}

/// Turns the next handler into a wrapped handler.
pub trait Middleware: Send + Sync {
    /// Stable name used when inspecting a composed route.
    fn name(&self) -> &'static str;

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

/// Wraps `handler` so the first middleware in the list runs first.
pub fn wrap_middleware(
    middlewares: &[Arc<dyn Middleware>],
    handler: Arc<dyn Handler>,
) -> Arc<dyn Handler> {
    middlewares
        .iter()
        .rev()
        .fold(handler, |next, middleware| middleware.wrap(next))
}

type Action<T> = for<'a> fn(&'a T, &'a mut Context, Request) -> HandlerFuture<'a>;

/// Leaf handler that dispatches to a method on a shared controller.
pub struct Endpoint<T> {
    target: Arc<T>,
    action: Action<T>,
}

impl<T> Endpoint<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(target: Arc<T>, action: Action<T>) -> Arc<dyn Handler> {
        Arc::new(Self { target, action })
    }
}

impl<T> Handler for Endpoint<T>
where
    T: Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        (self.action)(self.target.as_ref(), ctx, req)
    }
}
