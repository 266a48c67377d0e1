//! Middlewares composed into every route chain.
//!
//! Global middlewares, in the order they wrap each route:
//!
//! 1. [`Logger`]: one log line per request with trace id, status and latency
//! 2. [`Errors`]: answers errors with the JSON error body and forwards
//!    shutdown errors to the server
//! 3. [`RequestMetrics`]: request, error and in-flight counters
//! 4. [`Panics`]: turns panics into unclassified errors
//!
//! Route middlewares: [`Authenticate`] then [`Authorize`].

pub mod auth;
pub mod errors;
pub mod logger;
pub mod metrics;
pub mod panics;

use std::sync::Arc;

pub use auth::{Authenticate, Authorize};
pub use errors::Errors;
pub use logger::Logger;
pub use metrics::RequestMetrics;
pub use panics::Panics;

use crate::metrics::Metrics;
use crate::web::{Middleware, ShutdownSignal};

/// The global middleware list, outermost first.
pub fn global(shutdown: ShutdownSignal, metrics: Arc<Metrics>) -> Vec<Arc<dyn Middleware>> {
    vec![
        Arc::new(Logger),
        Arc::new(Errors::new(shutdown)),
        Arc::new(RequestMetrics::new(metrics)),
        Arc::new(Panics::new()),
    ]
}
