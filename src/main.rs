use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use dotenvy::dotenv;
use sales_api::logging::init_tracing;
use sales_api::metrics::{init_metrics, metrics_app};
use sales_api::router::init_router;
use sales_api::state::init_app_state;
use sales_api::web::{ShutdownCause, shutdown, wait_for_shutdown};
use sales_auth::Authenticator;
use sales_config::{AuthConfig, DatabaseConfig, WebConfig};
use sales_db::init_db_pool;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let web_config = WebConfig::from_env();
    init_tracing(&web_config.log_dir)?;

    if let Err(err) = run(web_config).await {
        error!(error = %format!("{:#}", err), "Shutting down");
        return Err(err);
    }

    Ok(())
}

async fn run(web_config: WebConfig) -> anyhow::Result<()> {
    let db_config = DatabaseConfig::from_env();
    let auth_config = AuthConfig::from_env();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting service");

    let (authenticator, _key_ring) =
        Authenticator::from_config(&auth_config).context("constructing authenticator")?;
    let pool = init_db_pool(&db_config);
    let state = init_app_state(pool.clone(), Arc::new(authenticator), &auth_config)?;

    // Debug listener
    let prometheus = init_metrics()?;
    let debug_listener = TcpListener::bind(&web_config.debug_host)
        .await
        .with_context(|| format!("binding debug listener {}", web_config.debug_host))?;
    info!(addr = %web_config.debug_host, "Debug listener started");
    let debug_app = metrics_app(prometheus, state.metrics.clone());
    tokio::spawn(async move {
        if let Err(err) = axum::serve(debug_listener, debug_app).await {
            error!(error = %err, "Debug listener closed");
        }
    });

    // API listener
    let (signal, receiver) = shutdown::channel();
    let router = init_router(&state, signal, web_config.request_timeout);
    let listener = TcpListener::bind(&web_config.api_host)
        .await
        .with_context(|| format!("binding API listener {}", web_config.api_host))?;
    info!(addr = %web_config.api_host, "API listening");

    let (cause_tx, cause_rx) = oneshot::channel();
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let cause = wait_for_shutdown(receiver).await;
        info!(cause = ?cause, "Shutdown started");
        let _ = cause_tx.send(cause);
    });
    let mut server = tokio::spawn(server.into_future());

    let cause = tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        cause = cause_rx => cause.context("shutdown cause channel closed")?,
    };

    match tokio::time::timeout(web_config.shutdown_timeout, &mut server).await {
        Ok(result) => result??,
        Err(_) => {
            server.abort();
            warn!(timeout = ?web_config.shutdown_timeout, "Graceful shutdown timed out");
            pool.close().await;
            return Err(anyhow!("could not stop server gracefully"));
        }
    }

    pool.close().await;

    match cause {
        ShutdownCause::Integrity(reason) => {
            Err(anyhow!("integrity issue caused shutdown: {}", reason))
        }
        ShutdownCause::Interrupt | ShutdownCause::Terminate => {
            info!("Shutdown complete");
            Ok(())
        }
    }
}
