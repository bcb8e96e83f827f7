//! Administrative Rotation Routes
//!
//! Reset a named rotation stream or inspect its raw state. Unlike the feed
//! route these are not fail-soft: callers are operators who want the real
//! error.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use carousel_core::RotationSnapshot;
use carousel_rotation::RotationManager;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response of a successful reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ResetResponse {
    pub key: String,
    pub reset: bool,
}

/// POST /api/v1/rotation/{key}/reset - Force a stream back to cycle zero
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/api/v1/rotation/{key}/reset",
    tag = "Rotation",
    params(
        ("key" = String, Path, description = "Rotation stream key")
    ),
    responses(
        (status = 200, description = "Stream reset", body = ResetResponse),
        (status = 404, description = "Stream never advanced", body = ApiError),
    )
))]
pub async fn reset_stream(
    State(manager): State<Arc<RotationManager>>,
    Path(key): Path<String>,
) -> ApiResult<Json<ResetResponse>> {
    let existed = manager.reset(&key).map_err(ApiError::from)?;
    if !existed {
        return Err(ApiError::stream_not_found(&key));
    }
    Ok(Json(ResetResponse { key, reset: true }))
}

/// GET /api/v1/rotation/{key}/stats - Raw state snapshot for a stream
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/rotation/{key}/stats",
    tag = "Rotation",
    params(
        ("key" = String, Path, description = "Rotation stream key")
    ),
    responses(
        (status = 200, description = "Stream snapshot", body = RotationSnapshot),
        (status = 404, description = "Stream never advanced", body = ApiError),
    )
))]
pub async fn stream_stats(
    State(manager): State<Arc<RotationManager>>,
    Path(key): Path<String>,
) -> ApiResult<Json<RotationSnapshot>> {
    let snapshot = manager
        .stats(&key)
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::stream_not_found(&key))?;
    Ok(Json(snapshot))
}

/// Build the rotation admin sub-router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/:key/reset", post(reset_stream))
        .route("/:key/stats", get(stream_stats))
}
