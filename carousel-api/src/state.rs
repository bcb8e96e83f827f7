//! Shared application state for Axum routers.

use std::sync::Arc;

use carousel_rotation::{FeedService, RotationManager};

/// Application-wide state shared across all routes.
///
/// Both handles are constructed once in `main` and injected here; nothing
/// in the API layer reaches for ambient singletons.
#[derive(Clone)]
pub struct AppState {
    /// Feed assembly entry point (manager + resolver + cache behind it).
    pub feed: Arc<FeedService>,
    /// Direct manager handle for administrative reset/stats routes.
    pub manager: Arc<RotationManager>,
    pub start_time: std::time::Instant,
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(Arc<FeedService>, feed);
crate::impl_from_ref!(Arc<RotationManager>, manager);
crate::impl_from_ref!(std::time::Instant, start_time);
