//! Carousel API Server Entry Point
//!
//! Bootstraps configuration, wires the rotation engine over in-process
//! backends, and starts the Axum HTTP server.

use std::sync::Arc;

use carousel_api::telemetry::init_tracing;
use carousel_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use carousel_core::{CarouselError, EligibilityCriteria, RotationConfig};
use carousel_rotation::{ContentWindowResolver, FeedService, RotationManager};
use carousel_storage::{CacheConfig, InMemoryCatalog, InMemoryStateStore, WindowCache};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing();

    let api_config = ApiConfig::from_env();
    let rotation_config = RotationConfig::from_env();
    rotation_config
        .validate()
        .map_err(|e| ApiError::internal_error(format!("Invalid rotation config: {}", e)))?;

    let criteria = EligibilityCriteria::default();
    criteria
        .validate()
        .map_err(|e| ApiError::internal_error(format!("Invalid eligibility criteria: {}", e)))?;

    // In-memory backends for development and single-process deployments.
    // Production swaps these for the platform's durable store and catalog
    // behind the same traits; the cache stays process-local by design.
    let store = Arc::new(InMemoryStateStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());

    let manager = Arc::new(RotationManager::with_defaults(store));
    let resolver = Arc::new(ContentWindowResolver::new(catalog, criteria));
    let cache = Arc::new(WindowCache::new(
        CacheConfig::new().with_default_ttl(rotation_config.cache_ttl),
    ));

    let feed = Arc::new(
        FeedService::new(
            Arc::clone(&manager),
            resolver,
            Arc::clone(&cache),
            rotation_config,
        )
        .map_err(|e: CarouselError| {
            ApiError::internal_error(format!("Failed to initialize feed service: {}", e))
        })?,
    );

    // Expired entries are already treated as absent on read; this sweep only
    // reclaims their memory.
    let sweep_cache = Arc::clone(&cache);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            let reclaimed = sweep_cache.purge_expired();
            if reclaimed > 0 {
                tracing::debug!(reclaimed, "cache sweep reclaimed expired entries");
            }
        }
    });

    let state = AppState {
        feed,
        manager,
        start_time: std::time::Instant::now(),
    };
    let app = create_api_router(state);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Carousel API server");

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

    Ok(())
}
