use crate::adapters::{DocumentStore, LocalStorage};
use crate::config::FleetConfig;
use crate::core::VehicleService;
use crate::http::{build_router, AppState};
use crate::utils::error::Result;
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Opens the snapshot-backed store named by `store.data_file`.
pub async fn open_store(config: &FleetConfig) -> Result<Arc<DocumentStore<LocalStorage>>> {
    let (dir, file) = config.snapshot_location();
    let store = DocumentStore::open(LocalStorage::new(dir), file).await?;
    Ok(Arc::new(store))
}

pub fn app_state(config: &FleetConfig, service: VehicleService) -> AppState {
    AppState::new(service)
        .with_pagination_defaults(
            config.pagination.default_page,
            config.pagination.default_limit,
        )
        .with_request_timeout(config.request_timeout())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Runs the API until a shutdown signal, then flushes the store.
pub async fn serve(config: &FleetConfig) -> anyhow::Result<()> {
    let store = open_store(config)
        .await
        .with_context(|| format!("failed to open store {}", config.store.data_file))?;
    let service = VehicleService::new(store.clone());
    let app = build_router(app_state(config, service));

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!("🚀 fleet-registry listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("Shutting down, flushing store");
    store.close().await.context("failed to flush store")?;
    Ok(())
}

/// Serves `state` on an ephemeral local port in the background.
pub async fn spawn_router(state: AppState) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = build_router(state);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Background server stopped: {}", e);
        }
    });
    Ok(addr)
}
