//! HTTP server initialization and runtime setup.
//!
//! Handles logging, store selection and the Axum server lifecycle.

use crate::config::Config;
use crate::domain::backend::QueryBackend;
use crate::infrastructure::cache::{CacheStore, MemoryCache, NullCache, RedisCache};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `level` is an `EnvFilter` directive string (the `RUST_LOG` value);
/// `format` is `text` or `json`.
///
/// # Errors
///
/// Returns an error if the filter cannot be parsed or a subscriber is
/// already installed.
pub fn init_tracing(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log filter '{}'", level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
}

/// Picks the store for this process.
///
/// - Redis when configured, falling back to [`NullCache`] if it is unreachable
/// - [`MemoryCache`] when Redis is not configured
/// - [`NullCache`] when the in-process store has zero capacity
pub async fn build_store(config: &Config) -> Arc<dyn CacheStore> {
    if let Some(redis_url) = &config.redis_url {
        return match RedisCache::connect(redis_url, &config.key_namespace).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        };
    }

    if config.memory_max_entries > 0 {
        tracing::info!(
            "Cache enabled (in-process, {} entries)",
            config.memory_max_entries
        );
        Arc::new(MemoryCache::new(config.memory_max_entries))
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    }
}

/// Runs the HTTP server in front of `backend`.
///
/// Stops accepting connections on Ctrl-C and waits for in-flight requests.
///
/// # Errors
///
/// Returns an error if:
/// - The listen address is invalid
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config, backend: Arc<dyn QueryBackend>) -> Result<()> {
    let store = build_store(&config).await;
    let state = AppState::new(store, backend, config.caching_settings());

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
