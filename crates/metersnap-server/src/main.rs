//! metersnap server
//!
//! - POST  /readings           : photo -> vision reading -> stored
//! - PATCH /readings/confirm   : confirm (and correct) a reading
//! - GET   /{customer}/readings: list, optional `?kind=`
//! - GET   /health, /metrics

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metersnap_core::error::{MeterError, Result};
use metersnap_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "metersnap-server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cfg = config::load()?;
    let listen = cfg.server.listen_addr()?;
    let provider = cfg.vision.provider;

    let state = AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, ?provider, "metersnap-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| MeterError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MeterError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
