//! Feed assembly: rotation, resolution, and the response envelope.
//!
//! `FeedService` is the entry point the HTTP layer consumes. It picks the
//! rotation mode (cyclic through the manager, or manual when the caller
//! supplies an offset), consults the window cache before resolving, and
//! wraps everything in an envelope that degrades softly: a backing-store
//! failure produces `success = false` with an empty window rather than an
//! error, so callers can fall back to an unrotated default.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use carousel_core::{
    CarouselResult, CatalogEntry, ContentWindow, CycleInfo, RotationConfig, RotationMode,
    ceil_div,
};
use carousel_storage::{window_key, WindowCache};

use crate::manager::RotationManager;
use crate::resolver::ContentWindowResolver;

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Parameters of one feed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedRequest {
    /// Explicit offset; supplying one switches the request to manual mode
    /// and bypasses the rotation manager.
    pub offset: Option<i64>,
    /// Window size; defaulted and capped by [`RotationConfig`].
    pub limit: Option<i64>,
    /// Force manual mode even without an offset (serves the top window).
    pub manual: bool,
    /// Reset the stream before serving. Privilege enforcement is the
    /// caller's concern (the auth layer sits outside this crate).
    pub reset: bool,
}

/// The window payload of a feed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedData {
    pub items: Vec<CatalogEntry>,
    pub total: i64,
    pub offset: i64,
    pub has_more: bool,
}

/// Rotation position metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RotationMeta {
    pub current_offset: i64,
    pub total_pages: i64,
    pub current_page: i64,
    /// Whether the engine advanced the position for this request.
    pub is_rotating: bool,
    pub is_manual: bool,
    pub is_cyclic: bool,
    /// Present in cyclic mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_info: Option<CycleInfo>,
}

/// Cache observability metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CacheMeta {
    pub from_cache: bool,
    pub cache_key: String,
}

/// Full response metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedMeta {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
    pub has_more: bool,
    pub next_offset: i64,
    pub rotation: RotationMeta,
    pub cache: CacheMeta,
}

/// Feed response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FeedResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: FeedData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FeedMeta>,
}

impl FeedResponse {
    /// Fail-soft envelope: empty window, no metadata.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: FeedData::default(),
            meta: None,
        }
    }
}

// ============================================================================
// FEED SERVICE
// ============================================================================

/// Assembles feed windows from the manager, resolver, and cache.
pub struct FeedService {
    manager: Arc<RotationManager>,
    resolver: Arc<ContentWindowResolver>,
    cache: Arc<WindowCache>,
    config: RotationConfig,
}

impl FeedService {
    /// Create a feed service. The configuration is validated once here;
    /// nothing is re-checked per call.
    pub fn new(
        manager: Arc<RotationManager>,
        resolver: Arc<ContentWindowResolver>,
        cache: Arc<WindowCache>,
        config: RotationConfig,
    ) -> CarouselResult<Self> {
        config.validate()?;
        Ok(Self {
            manager,
            resolver,
            cache,
            config,
        })
    }

    /// The stream key this feed rotates under.
    pub fn stream_key(&self) -> &str {
        &self.config.stream_key
    }

    /// Serve one feed window. Never fails: errors degrade to a
    /// `success = false` envelope.
    pub fn fetch(&self, request: &FeedRequest) -> FeedResponse {
        match self.fetch_inner(request) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(
                    stream = %self.config.stream_key,
                    error = %err,
                    "feed request degraded to fallback envelope"
                );
                FeedResponse::failure(err.to_string())
            }
        }
    }

    fn fetch_inner(&self, request: &FeedRequest) -> CarouselResult<FeedResponse> {
        let limit = request
            .limit
            .unwrap_or(self.config.window_size)
            .clamp(1, self.config.max_window_size);

        if request.reset {
            self.manager.reset(&self.config.stream_key)?;
        }

        let mode = if request.manual || request.offset.is_some() {
            RotationMode::Manual
        } else {
            RotationMode::Cyclic
        };

        let (offset, cycle_info) = match mode {
            RotationMode::Manual => (request.offset.unwrap_or(0), None),
            RotationMode::Cyclic => {
                let live_total = self.resolver.live_total()?;
                let advancement =
                    self.manager
                        .advance(&self.config.stream_key, live_total, limit)?;
                (advancement.offset, Some(advancement.cycle_info))
            }
        };

        let cache_key = window_key(mode, offset, limit);
        let (window, from_cache) = match self.cached_window(&cache_key) {
            Some(window) => (window, true),
            None => {
                let window = self.resolver.resolve(offset, limit)?;
                self.populate_cache(&cache_key, &window);
                (window, false)
            }
        };

        let rotation = RotationMeta {
            current_offset: window.offset,
            total_pages: if window.total > 0 {
                ceil_div(window.total, limit)
            } else {
                0
            },
            current_page: if window.total > 0 {
                window.offset / limit + 1
            } else {
                0
            },
            is_rotating: mode == RotationMode::Cyclic,
            is_manual: mode == RotationMode::Manual,
            is_cyclic: mode == RotationMode::Cyclic,
            cycle_info,
        };

        let meta = FeedMeta {
            offset: window.offset,
            limit,
            total: window.total,
            has_more: window.has_more,
            next_offset: window.next_offset,
            rotation,
            cache: CacheMeta {
                from_cache,
                cache_key,
            },
        };

        Ok(FeedResponse {
            success: true,
            message: None,
            data: FeedData {
                items: window.items,
                total: window.total,
                offset: window.offset,
                has_more: window.has_more,
            },
            meta: Some(meta),
        })
    }

    /// Cached window for `key`, if present and decodable. A payload that no
    /// longer deserializes is dropped and treated as a miss.
    fn cached_window(&self, key: &str) -> Option<ContentWindow> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(window) => Some(window),
            Err(err) => {
                tracing::debug!(key, error = %err, "evicting undecodable cache entry");
                self.cache.delete(key);
                None
            }
        }
    }

    /// Best-effort cache population; serialization failures are logged and
    /// swallowed because the cache is never a correctness dependency.
    fn populate_cache(&self, key: &str, window: &ContentWindow) {
        match serde_json::to_value(window) {
            Ok(value) => self.cache.set(key, value, Some(self.config.cache_ttl)),
            Err(err) => {
                tracing::debug!(key, error = %err, "skipping cache population");
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
