use std::time::Duration;

use tickerwatch_server::{
    api::app_router, build_state, config::Config, init_tracing, scheduler::start_refresh_scheduler,
};
use tokio_util::sync::CancellationToken;

/// How long the refresh loop gets to finish its current tick on shutdown.
const SCHEDULER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.server.log_level);

    let shutdown = CancellationToken::new();
    let state = build_state(&config, shutdown.clone()).await?;
    let refresh = start_refresh_scheduler(state.clone(), &config)?;

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    if let Some(handle) = refresh {
        if let Err(e) = handle.shutdown(SCHEDULER_SHUTDOWN_TIMEOUT).await {
            tracing::warn!("Refresh scheduler did not stop cleanly: {}", e);
        }
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
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
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
