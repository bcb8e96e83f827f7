//! Feed Retrieval Route
//!
//! Serves the rotating novelties window. The response is always HTTP 200
//! with the feed envelope: backing-store failures surface as
//! `success = false` so clients can fall back to an unrotated default
//! instead of handling an error status.
//!
//! Privilege checks for `reset` belong to the authentication layer in front
//! of this service; the route itself only forwards the flag.

use axum::{extract::Query, extract::State, routing::get, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use carousel_rotation::{FeedRequest, FeedResponse, FeedService};

use crate::state::AppState;

/// Query parameters of the feed route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    /// Explicit offset; supplying one switches to manual mode.
    pub offset: Option<i64>,
    /// Window size; defaulted and capped server-side.
    pub limit: Option<i64>,
    /// Force manual mode even without an offset.
    pub manual: Option<bool>,
    /// Reset the stream before serving (privileged callers only).
    pub reset: Option<bool>,
}

/// GET /api/v1/feed - Fetch the current rotation window
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/api/v1/feed",
    tag = "Feed",
    params(
        ("offset" = Option<i64>, Query, description = "Explicit offset (manual mode)"),
        ("limit" = Option<i64>, Query, description = "Window size, capped server-side"),
        ("manual" = Option<bool>, Query, description = "Force manual mode even without an offset"),
        ("reset" = Option<bool>, Query, description = "Reset the stream before serving"),
    ),
    responses(
        (status = 200, description = "Feed window (fail-soft envelope)", body = FeedResponse),
    )
))]
pub async fn fetch_feed(
    State(feed): State<Arc<FeedService>>,
    Query(params): Query<FeedQuery>,
) -> Json<FeedResponse> {
    let request = FeedRequest {
        offset: params.offset,
        limit: params.limit,
        manual: params.manual.unwrap_or(false),
        reset: params.reset.unwrap_or(false),
    };
    Json(feed.fetch(&request))
}

/// Build the feed sub-router.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(fetch_feed))
}
