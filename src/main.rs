use circulation_desk::{
    adapters::{file::FileSnapshotStore, system::SystemClock},
    api::{AppState, create_router},
    application::library::{self, open_library},
    config::AppConfig,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circulation_desk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(data_path = %config.data_path.display(), "Configuration loaded");

    // Initialize adapters
    let snapshot_store = Arc::new(FileSnapshotStore::new(config.data_path.clone()));
    let clock = Arc::new(SystemClock::new());

    // Restore state from the last snapshot (or start empty)
    let service_deps = open_library(snapshot_store, clock).await?;

    // Create application state
    let app_state = Arc::new(AppState {
        service_deps: service_deps.clone(),
    });

    // Create router
    let app = create_router(app_state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Persist once more so a failed autosave is not lost on exit
    library::flush(&service_deps).await?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
