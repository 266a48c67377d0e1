//! Request pipeline primitives.
//!
//! Every route is a chain of [`Handler`]s built by wrapping a leaf handler in
//! route middlewares and then in the global middlewares. The chain receives a
//! per-request [`Context`] by mutable reference and returns
//! `Result<Response, AppError>`; errors unwind back through the chain so the
//! outer layers can log, count and answer them.
//!
//! ```text
//! logger -> errors -> metrics -> panics -> authenticate -> authorize -> leaf
//! ```
//!
//! - [`context`]: per-request values and claims
//! - [`handler`]: the `Handler` and `Middleware` traits and composition
//! - [`respond`]: JSON responder and error responder
//! - [`request`]: body decoding with validation
//! - [`shutdown`]: channel used to ask the server to stop
//! - [`app`]: route registration and the request driver

pub mod app;
pub mod context;
pub mod handler;
pub mod request;
pub mod respond;
pub mod shutdown;

pub use app::{App, drive};
pub use context::{Context, Values};
pub use handler::{Endpoint, Handler, HandlerFuture, Middleware, wrap_middleware};
pub use respond::{respond, respond_error};
pub use shutdown::{
    ShutdownCause, ShutdownReceiver, ShutdownRequest, ShutdownSignal, wait_for_shutdown,
};
