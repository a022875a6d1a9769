//! Redis Facade - HTTP server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redis_facade::store::{CacheBackend, MemoryBackend, RedisBackend};
use redis_facade::{create_router, spawn_cleanup_task, AppState, BackendKind, CacheFacade, Config};

/// Main entry point for the cache facade server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the configured store backend
/// 4. Start the TTL sweep when running in memory
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redis_facade=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Redis Facade");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, port={}, origin={}, strict_keys={}, store_timeout_ms={:?}",
        config.backend, config.server_port, config.origin, config.strict_keys, config.store_timeout_ms
    );

    let (backend, cleanup_handle) = connect_backend(&config).await?;

    let facade = CacheFacade::new(backend)
        .with_strict_keys(config.strict_keys)
        .with_timeout(config.store_timeout());
    let app = create_router(AppState::new(facade), &config.origin);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the configured backend, plus the sweep task for the memory store.
async fn connect_backend(
    config: &Config,
) -> anyhow::Result<(Arc<dyn CacheBackend>, Option<JoinHandle<()>>)> {
    match config.backend {
        BackendKind::Redis => {
            let url = config.redis_url();
            let backend = RedisBackend::connect(&url)
                .await
                .with_context(|| format!("failed to connect to {}", url))?;
            Ok((Arc::new(backend), None))
        }
        BackendKind::Memory => {
            let backend = MemoryBackend::new(config.max_entries);
            let handle = spawn_cleanup_task(backend.shared(), config.cleanup_interval);
            info!(
                "In-memory store initialized: max_entries={}, cleanup_interval={}s",
                config.max_entries, config.cleanup_interval
            );
            Ok((Arc::new(backend), Some(handle)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task if one is running.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cleanup task aborted");
    }
}
