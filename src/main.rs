//! Unified Cache server
//!
//! Serves the unified cache facade over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unified_cache::api::create_router;
use unified_cache::backends::BackendKind;
use unified_cache::cache::{Cache, LruEngine};
use unified_cache::error::CacheError;
use unified_cache::{AppState, Config, UnifiedCache};

/// Main entry point for the Unified Cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Connect every configured backend and build the facade
/// 4. Start HTTP server on configured port
/// 5. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unified_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Unified Cache Server");

    let config = Config::from_env().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    info!(
        "Configuration loaded: capacity={}, default_ttl={}s, port={}, backends={:?}, mode={}",
        config.capacity,
        config.default_ttl,
        config.server_port,
        config.backends,
        config.default_route
    );

    let cache = build_cache(&config).await?;
    info!(backends = ?cache.backends().collect::<Vec<_>>(), "Cache facade initialized");

    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Builds the facade from validated configuration. Any remote backend that
/// cannot be reached aborts startup.
async fn build_cache(config: &Config) -> anyhow::Result<UnifiedCache> {
    let mut builder = UnifiedCache::builder(config.facade());

    if config.is_active(BackendKind::Lru) {
        builder = builder.local(Arc::new(LruEngine::new(config.capacity)));
    }
    if config.is_active(BackendKind::Redis) {
        builder = builder.key_value(connect_redis(config).await?);
    }
    if config.is_active(BackendKind::Memcached) {
        builder = builder.memory_object(connect_memcached(config).await?);
    }

    Ok(builder.build()?)
}

#[cfg(feature = "redis-backend")]
async fn connect_redis(config: &Config) -> Result<Arc<dyn Cache>, CacheError> {
    use unified_cache::backends::{require_address, KeyValueStore, RedisClient};

    let addr = require_address(BackendKind::Redis, config.address(BackendKind::Redis))?;
    let client = RedisClient::open(addr)
        .await
        .map_err(|e| CacheError::unavailable(BackendKind::Redis, e))?;
    let store = KeyValueStore::connect(client).await?;
    info!(addr, "Connected to redis");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis-backend"))]
async fn connect_redis(_config: &Config) -> Result<Arc<dyn Cache>, CacheError> {
    Err(CacheError::InvalidConfiguration(
        "redis backend requested but the server was built without the `redis-backend` feature"
            .to_string(),
    ))
}

#[cfg(feature = "memcached-backend")]
async fn connect_memcached(config: &Config) -> Result<Arc<dyn Cache>, CacheError> {
    use unified_cache::backends::{require_address, MemcachedClient, MemoryObjectStore};

    let addr = require_address(BackendKind::Memcached, config.address(BackendKind::Memcached))?;
    let client = MemcachedClient::open(addr)
        .await
        .map_err(|e| CacheError::unavailable(BackendKind::Memcached, e))?;
    let store = MemoryObjectStore::connect(client).await?;
    info!(addr, "Connected to memcached");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "memcached-backend"))]
async fn connect_memcached(_config: &Config) -> Result<Arc<dyn Cache>, CacheError> {
    Err(CacheError::InvalidConfiguration(
        "memcached backend requested but the server was built without the `memcached-backend` feature"
            .to_string(),
    ))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}
