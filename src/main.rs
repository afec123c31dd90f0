//! Orbit Cache - Kepler orbit propagation server
//!
//! Serves body transforms over time windows from a prefetching transform cache.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orbit_cache::api::create_router;
use orbit_cache::service::CatalogProvider;
use orbit_cache::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the orbit cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Load the element catalog (file or built-in)
/// 4. Start background TTL cleanup task
/// 5. Serve the Axum router on the configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orbit_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Orbit Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, ttl={}s, policy={}, multiplier={}, port={}, cleanup_interval={}s",
        config.max_entries,
        config.cache_ttl,
        config.eviction_policy,
        config.prefetch_multiplier,
        config.server_port,
        config.cleanup_interval
    );

    let catalog = match &config.catalog_path {
        Some(path) => CatalogProvider::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => CatalogProvider::solar_system(),
    };
    info!("Element catalog loaded with {} bodies", catalog.len());

    let state = AppState::from_config(&config, Arc::new(catalog));

    let cleanup_handle = spawn_cleanup_task(state.service.clone(), config.cleanup_interval);
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the cleanup task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}
