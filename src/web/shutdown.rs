//! Channel the request pipeline uses to ask the server to stop.

use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownRequest {
    pub reason: String,
}

/// Sending half, cloned into every component allowed to stop the server.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: mpsc::UnboundedSender<ShutdownRequest>,
}

/// Receiving half, owned by the server loop.
#[derive(Debug)]
pub struct ShutdownReceiver {
    rx: mpsc::UnboundedReceiver<ShutdownRequest>,
}

pub fn channel() -> (ShutdownSignal, ShutdownReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ShutdownSignal { tx }, ShutdownReceiver { rx })
}

impl ShutdownSignal {
    pub fn signal(&self, reason: impl Into<String>) {
        let request = ShutdownRequest {
            reason: reason.into(),
        };
        error!(reason = %request.reason, "Integrity error, requesting shutdown");
        if self.tx.send(request).is_err() {
            warn!("Shutdown already in progress");
        }
    }
}

impl ShutdownReceiver {
    /// Waits for the next shutdown request. Returns `None` once every sender
    /// is gone.
    pub async fn recv(&mut self) -> Option<ShutdownRequest> {
        self.rx.recv().await
    }

    /// Non-blocking check, used to count requests in tests.
    pub fn try_recv(&mut self) -> Option<ShutdownRequest> {
        self.rx.try_recv().ok()
    }
}

/// Why the server is stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownCause {
    Interrupt,
    Terminate,
    /// Requested by the pipeline after an integrity error.
    Integrity(String),
}

/// Resolves on Ctrl-C, SIGTERM or the first request from the pipeline.
pub async fn wait_for_shutdown(mut receiver: ShutdownReceiver) -> ShutdownCause {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let integrity = async {
        match receiver.recv().await {
            Some(request) => request.reason,
            None => std::future::pending::<String>().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => ShutdownCause::Interrupt,
        _ = terminate => ShutdownCause::Terminate,
        reason = integrity => ShutdownCause::Integrity(reason),
    }
}
