//! Rotation stream state and advancement results.
//!
//! One `RotationState` record exists per named rotation stream. It is created
//! lazily on the first advancement, mutated only through the rotation
//! manager's compare-and-swap write path, and never deleted (reset only
//! zeroes the offset and cycle fields).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// How a window's position was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// Caller supplied the offset explicitly; the manager is bypassed.
    Manual,
    /// Offset advances automatically through the rotation manager.
    Cyclic,
}

impl RotationMode {
    /// Stable lowercase label, used in cache keys and response metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationMode::Manual => "manual",
            RotationMode::Cyclic => "cyclic",
        }
    }
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable progress record for one rotation stream.
///
/// Invariant: `0 <= offset < total_items` whenever `total_items > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RotationState {
    /// Stream key, e.g. `"novelties"`.
    pub key: String,
    /// Current position into the eligible set.
    pub offset: i64,
    /// Last-known size of the eligible set.
    pub total_items: i64,
    /// Items returned per window.
    pub window_size: i64,
    /// Completed full passes, monotonically non-decreasing.
    pub cycle_count: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub cycle_started_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub last_updated: Timestamp,
    /// Opaque extension data.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<serde_json::Value>,
}

impl RotationState {
    /// Fresh state at the start of cycle zero.
    pub fn new(
        key: impl Into<String>,
        total_items: i64,
        window_size: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            key: key.into(),
            offset: 0,
            total_items,
            window_size,
            cycle_count: 0,
            cycle_started_at: now,
            last_updated: now,
            metadata: None,
        }
    }

    /// 1-based page the current offset falls on, or 0 when the set is empty.
    pub fn current_page(&self) -> i64 {
        if self.total_items <= 0 || self.window_size <= 0 {
            return 0;
        }
        self.offset / self.window_size + 1
    }

    /// Number of windows in one full cycle, or 0 when the set is empty.
    pub fn total_pages(&self) -> i64 {
        if self.total_items <= 0 || self.window_size <= 0 {
            return 0;
        }
        ceil_div(self.total_items, self.window_size)
    }
}

/// Cycle position metadata derived from a state record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CycleInfo {
    /// Whether this advancement started a fresh cycle (wrap, resize, or
    /// first advancement of the stream).
    pub is_new_cycle: bool,
    pub cycle_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub cycle_started_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub last_updated: Timestamp,
}

impl CycleInfo {
    /// Derive cycle metadata from a persisted state.
    pub fn from_state(state: &RotationState, is_new_cycle: bool) -> Self {
        Self {
            is_new_cycle,
            cycle_count: state.cycle_count,
            current_page: state.current_page(),
            total_pages: state.total_pages(),
            cycle_started_at: state.cycle_started_at,
            last_updated: state.last_updated,
        }
    }

    /// Metadata for an advancement over an empty eligible set.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            is_new_cycle: false,
            cycle_count: 0,
            current_page: 0,
            total_pages: 0,
            cycle_started_at: now,
            last_updated: now,
        }
    }
}

/// Result of one advancement of a rotation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Advancement {
    /// Offset the forthcoming window should be served at.
    pub offset: i64,
    pub cycle_info: CycleInfo,
    /// Whether the window starting at `offset` runs past the end of the
    /// eligible set and must be filled by wrapping to the start.
    pub needs_wrap_fill: bool,
    /// Items available before the wrap point (equals the window size when no
    /// wrap is needed).
    pub remaining_items: i64,
}

/// Read-only snapshot of a rotation stream, including derived paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RotationSnapshot {
    #[serde(flatten)]
    pub state: RotationState,
    pub current_page: i64,
    pub total_pages: i64,
}

impl From<RotationState> for RotationSnapshot {
    fn from(state: RotationState) -> Self {
        let current_page = state.current_page();
        let total_pages = state.total_pages();
        Self {
            state,
            current_page,
            total_pages,
        }
    }
}

/// Integer ceiling division for positive operands.
pub fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1) / denominator
}

// =============================================================================
// TESTS
// =============================================================================
