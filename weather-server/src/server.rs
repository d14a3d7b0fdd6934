//! Server bootstrap and graceful shutdown

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use weather_core::Config;

use crate::{routes::create_router, state::AppState};

/// Bind the configured address and serve until Ctrl+C / SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;

    if !state.service.api_key_configured() {
        warn!(
            "No API key configured; set WEATHER_API_KEY or run `weather-server configure`. \
             Weather lookups will fail until then"
        );
    }

    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    info!(
        addr = %addr,
        upstream = %state.config.upstream.base_url,
        static_dir = %state.config.server.static_dir.display(),
        "Configuration loaded"
    );

    let app = create_router(state);
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {addr}"))?;

    info!("Weather server listening on http://{addr}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
