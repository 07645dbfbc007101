//! Invitra Relay Entry Point
//!
//! Loads the TOML config, wires the HTTP backend into the dedup saver,
//! starts the cache sweeper, and serves the Axum router until Ctrl-C.

use std::sync::Arc;

use invitra_api::{create_router, init_tracing, ApiError, ApiResult, AppState, RelayConfig};
use invitra_core::SystemClock;
use invitra_drafts::{spawn_sweeper, DraftSaver, HttpDraftBackend};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing()?;

    let config = RelayConfig::load()?;
    let addr = config.bind_addr()?;

    let backend = HttpDraftBackend::new(&config.backend_settings())?;
    tracing::info!(
        save_url = backend.save_url(),
        load_url = backend.load_url(),
        "Draft backend configured"
    );

    let saver = DraftSaver::new(
        Arc::new(backend),
        Arc::new(SystemClock::new()),
        config.dedup_config(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = spawn_sweeper(saver.cache().clone(), config.sweep_interval(), shutdown_rx);

    let app = create_router(AppState::new(saver));

    tracing::info!(
        %addr,
        debounce_window_ms = config.dedup.debounce_window_ms,
        save_timeout_ms = config.dedup.save_timeout_ms,
        "Starting Invitra relay"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    match sweeper.await {
        Ok(swept) => tracing::info!(swept, "Sweeper joined"),
        Err(e) => tracing::warn!(error = %e, "Sweeper task failed"),
    }

    Ok(())
}
