//! REST API Routes Module
//!
//! - Feed retrieval (fail-soft envelope)
//! - Administrative rotation routes (reset, stats)
//! - Health check endpoint
//! - CORS support for browser-based clients

use axum::{http::Method, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod feed;
pub mod health;
pub mod rotation;

use crate::state::AppState;

/// Build the full API router over the shared application state.
pub fn create_api_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/feed", feed::create_router())
        .nest("/rotation", rotation::create_router());

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
        .with_state(state)
}

/// Permissive CORS: the feed is public read-only data and the
/// administrative routes are protected upstream.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any)
        .allow_headers(Any)
}
