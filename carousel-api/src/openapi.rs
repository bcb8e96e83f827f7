//! OpenAPI documentation for the Carousel API.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthResponse, HealthStatus};
use crate::routes::rotation::ResetResponse;

/// OpenAPI document covering all routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Carousel API",
        description = "Rotating novelties feed for the content catalog"
    ),
    paths(
        crate::routes::feed::fetch_feed,
        crate::routes::rotation::reset_stream,
        crate::routes::rotation::stream_stats,
        crate::routes::health::health,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        HealthResponse,
        HealthStatus,
        ResetResponse,
        carousel_core::RotationSnapshot,
        carousel_core::RotationState,
        carousel_core::CycleInfo,
        carousel_core::CatalogEntry,
        carousel_core::EntryStatus,
    )),
    tags(
        (name = "Feed", description = "Rotating content windows"),
        (name = "Rotation", description = "Administrative stream operations"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().unwrap();
        assert!(json.contains("/api/v1/feed"));
        assert!(json.contains("/api/v1/rotation/{key}/reset"));
    }
}
