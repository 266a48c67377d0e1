use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use axum::extract::Request;
use futures::FutureExt;
use sales_core::AppError;
use tracing::error;

use crate::web::{Context, Handler, HandlerFuture, Middleware};

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static BACKTRACE_HOOK: Once = Once::new();

/// Records the backtrace at the panic site so the recovery point can log it.
/// The previously installed hook still runs.
fn install_backtrace_hook() {
    BACKTRACE_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture().to_string();
            LAST_BACKTRACE.with(|slot| *slot.borrow_mut() = Some(backtrace));
            previous(info);
        }));
    });
}

fn take_backtrace() -> String {
    LAST_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| "<unavailable>".to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Converts a panic anywhere in the inner chain into an unclassified error.
pub struct Panics;

impl Panics {
    pub fn new() -> Self {
        install_backtrace_hook();
        Self
    }
}

impl Default for Panics {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for Panics {
    fn name(&self) -> &'static str {
        "panics"
    }

    fn wrap(&self, next: Arc<dyn Handler>) -> Arc<dyn Handler> {
        Arc::new(PanicsHandler { next })
    }
}

struct PanicsHandler {
    next: Arc<dyn Handler>,
}

impl Handler for PanicsHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let trace_id = ctx
                .trace_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());

            match AssertUnwindSafe(self.next.call(ctx, req)).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    let backtrace = take_backtrace();
                    error!(
                        trace_id = %trace_id,
                        panic = %message,
                        backtrace = %backtrace,
                        "Recovered from panic"
                    );
                    Err(AppError::internal(anyhow::anyhow!("panic: {}", message)))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::Values;
    use axum::body::Body;
    use std::io;
    use std::sync::Mutex;

    /// In-memory sink for a test subscriber.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Exploding;

    impl Handler for Exploding {
        fn call<'a>(&'a self, _ctx: &'a mut Context, req: Request) -> HandlerFuture<'a> {
            Box::pin(async move {
                let quantity: u32 = req.uri().path().len().try_into().unwrap();
                let divisor: u32 = req.headers().len().try_into().unwrap();
                Ok(axum::response::Response::new(Body::from(format!("{}", quantity / divisor))))
            })
        }
    }

    #[tokio::test]
    async fn test_panic_is_recovered_and_logged_with_backtrace() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let chain = Panics::new().wrap(Arc::new(Exploding));
        let mut ctx = Context::new(Values::new());
        let trace_id = ctx.trace_id().unwrap();

        let err = chain
            .call(&mut ctx, Request::new(Body::empty()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unclassified(_)));
        assert!(err.to_string().contains("attempt to divide by zero"));

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Recovered from panic"), "{}", output);
        assert!(output.contains(&trace_id.to_string()), "{}", output);
        assert!(output.contains("backtrace="), "{}", output);
        assert!(!output.contains("backtrace=<unavailable>"), "{}", output);
    }

    #[test]
    fn test_panic_message_payloads() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(payload.as_ref()), "owned message");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
