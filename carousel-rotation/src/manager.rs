//! Atomic advancement of rotation streams.
//!
//! The manager is the only writer of rotation state. Every mutation is a
//! load / compute / compare-and-swap cycle: a concurrent writer that won the
//! race surfaces as a version conflict, and the losing cycle re-runs against
//! the fresh record. Offset and cycle count always land in the same write,
//! so they cannot diverge.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use carousel_core::{
    Advancement, CarouselError, CarouselResult, CycleInfo, RetryConfig, RotationError,
    RotationSnapshot, RotationState, StorageError,
};
use carousel_storage::RotationStateStore;

/// Orchestrates advancement, reset, and inspection of rotation streams.
pub struct RotationManager {
    store: Arc<dyn RotationStateStore>,
    retry: RetryConfig,
}

impl RotationManager {
    /// Create a manager over a state store.
    pub fn new(store: Arc<dyn RotationStateStore>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// Create a manager with the default retry policy.
    pub fn with_defaults(store: Arc<dyn RotationStateStore>) -> Self {
        Self::new(store, RetryConfig::default())
    }

    /// Advance a stream by one window and return the offset to serve.
    ///
    /// The served offset is the stream's stored position; the position that
    /// follows it (stepped by `window_size`, wrapped to 0 with a cycle bump
    /// when the step runs past `total_items`) is persisted for the next
    /// caller in the same atomic write. The first advancement of a stream —
    /// and the first after a reset — therefore serves offset 0. A
    /// `total_items` that moved by more than one window since the last call
    /// is treated as a structural change: the cycle restarts and this call
    /// serves the top of the ordering.
    ///
    /// `total_items == 0` is a no-op that serves an empty position.
    pub fn advance(
        &self,
        key: &str,
        total_items: i64,
        window_size: i64,
    ) -> CarouselResult<Advancement> {
        if window_size <= 0 {
            return Err(RotationError::InvalidWindow { window_size }.into());
        }
        if total_items < 0 {
            return Err(RotationError::InvalidTotal { total_items }.into());
        }
        if total_items == 0 {
            return Ok(Advancement {
                offset: 0,
                cycle_info: CycleInfo::empty(Utc::now()),
                needs_wrap_fill: false,
                remaining_items: 0,
            });
        }

        let mut attempt: u32 = 0;
        loop {
            let now = Utc::now();
            let (served, expected_version) = match self.store.load(key)? {
                None => (
                    RotationState::new(key, total_items, window_size, now),
                    None,
                ),
                Some(existing) => (
                    reconciled(existing.state, total_items, window_size, now),
                    Some(existing.version),
                ),
            };

            match self
                .store
                .store(key, expected_version, stepped(served.clone(), now))
            {
                Ok(_) => {
                    // Serving the top of the ordering is what "new cycle"
                    // means: first advancement, wrap, resize, or reset all
                    // land here with offset 0.
                    let is_new_cycle = served.offset == 0;
                    let needs_wrap_fill = served.offset + window_size > total_items;
                    let remaining_items = if needs_wrap_fill {
                        total_items - served.offset
                    } else {
                        window_size
                    };
                    tracing::debug!(
                        key,
                        offset = served.offset,
                        cycle = served.cycle_count,
                        is_new_cycle,
                        "advanced rotation stream"
                    );
                    return Ok(Advancement {
                        offset: served.offset,
                        cycle_info: CycleInfo::from_state(&served, is_new_cycle),
                        needs_wrap_fill,
                        remaining_items,
                    });
                }
                Err(CarouselError::Storage(StorageError::VersionConflict { .. })) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries.max(0) as u32 {
                        return Err(RotationError::ContentionExhausted {
                            key: key.to_string(),
                            attempts: attempt,
                        }
                        .into());
                    }
                    std::thread::sleep(self.retry.backoff_for_attempt(attempt - 1));
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Force a stream back to the start of a fresh cycle at `cycle_count = 0`.
    ///
    /// Leaves `total_items` and `window_size` untouched. Returns whether a
    /// record existed. Idempotent: resetting an already-reset stream changes
    /// nothing but the timestamps.
    pub fn reset(&self, key: &str) -> CarouselResult<bool> {
        let mut attempt: u32 = 0;
        loop {
            let Some(existing) = self.store.load(key)? else {
                return Ok(false);
            };

            let now = Utc::now();
            let mut state = existing.state;
            state.offset = 0;
            state.cycle_count = 0;
            state.cycle_started_at = now;
            state.last_updated = now;

            match self.store.store(key, Some(existing.version), state) {
                Ok(_) => {
                    tracing::info!(key, "rotation stream reset");
                    return Ok(true);
                }
                Err(CarouselError::Storage(StorageError::VersionConflict { .. })) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries.max(0) as u32 {
                        return Err(RotationError::ContentionExhausted {
                            key: key.to_string(),
                            attempts: attempt,
                        }
                        .into());
                    }
                    std::thread::sleep(self.retry.backoff_for_attempt(attempt - 1));
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Read-only snapshot of a stream, or `None` if it never advanced.
    pub fn stats(&self, key: &str) -> CarouselResult<Option<RotationSnapshot>> {
        Ok(self
            .store
            .load(key)?
            .map(|versioned| RotationSnapshot::from(versioned.state)))
    }
}

/// Fold the live set size into a stored record, producing the position this
/// call serves.
///
/// A size that moved by more than one window restarts the cycle rather than
/// serving a position into a set that no longer resembles the one it was
/// computed against. Smaller drift only overwrites `total_items` — except
/// when it strands the offset past the end of the set, which wraps early.
fn reconciled(
    mut state: RotationState,
    total_items: i64,
    window_size: i64,
    now: DateTime<Utc>,
) -> RotationState {
    state.last_updated = now;
    state.window_size = window_size;

    if (state.total_items - total_items).abs() > window_size {
        state.total_items = total_items;
        state.offset = 0;
        state.cycle_count += 1;
        state.cycle_started_at = now;
        return state;
    }

    state.total_items = total_items;
    if state.offset >= total_items {
        state.offset = 0;
        state.cycle_count += 1;
        state.cycle_started_at = now;
    }
    state
}

/// The position that follows `state` in its cycle: step by one window, wrap
/// to 0 (bumping the cycle count) when the step runs past the end.
fn stepped(mut state: RotationState, now: DateTime<Utc>) -> RotationState {
    let next = state.offset + state.window_size;
    if next >= state.total_items {
        state.offset = 0;
        state.cycle_count += 1;
        state.cycle_started_at = now;
    } else {
        state.offset = next;
    }
    state
}

// ============================================================================
// TESTS
// ============================================================================
