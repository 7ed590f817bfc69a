//! Padtree Server Entry Point
//!
//! Loads configuration, opens the LMDB store, wires the cache,
//! broadcaster, and service together, and serves HTTP until interrupted.

use std::net::SocketAddr;
use std::sync::Arc;

use padtree_api::{
    broadcast::BroadcasterConfig, create_api_router, telemetry, ApiConfig, ApiError, ApiResult,
    PadBroadcaster, PadService,
};
use padtree_storage::{spawn_sweeper, CacheConfig, LmdbPadStore, PadCache, PadStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let config = ApiConfig::from_env();
    telemetry::init_tracing(&config.log_filter);

    let store: Arc<dyn PadStore> =
        Arc::new(LmdbPadStore::open(&config.data_dir, config.db_map_size_mb)?);
    let cache = Arc::new(PadCache::new(
        CacheConfig::new()
            .with_ttl(config.cache_ttl)
            .with_sweep_interval(config.cache_sweep_interval),
    ));
    let broadcaster = Arc::new(PadBroadcaster::new(BroadcasterConfig {
        max_subscribers_per_topic: config.sse_max_subscribers,
        queue_capacity: config.sse_queue_capacity,
    }));
    let service = Arc::new(PadService::new(
        store.clone(),
        cache.clone(),
        broadcaster,
    ));

    let app = create_api_router(service, store, &config);
    let sweeper = spawn_sweeper(cache);

    let addr = config.socket_addr()?;
    tracing::info!(%addr, data_dir = %config.data_dir, "Starting padtree server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    sweeper.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}
