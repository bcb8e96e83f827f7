//! Carousel Storage - Storage Traits and In-Memory Implementations
//!
//! Defines the storage abstraction layer for rotation state and catalog
//! content. The durable backend behind `RotationStateStore` is deliberately
//! abstract: any record store that can do an atomic compare-and-swap per key
//! satisfies it.

pub mod cache;
pub mod content;

pub use cache::{window_key, CacheConfig, CacheStats, WindowCache};
pub use content::{ContentSource, InMemoryCatalog};

use std::collections::HashMap;
use std::sync::RwLock;

use carousel_core::{CarouselResult, RotationState, StorageError};

// ============================================================================
// VERSIONED RECORDS
// ============================================================================

/// A rotation state record paired with its compare-and-swap token.
///
/// The version never travels past the rotation manager; it exists so that
/// two concurrent read-modify-write cycles on the same key cannot both
/// persist against the same snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedState {
    pub state: RotationState,
    pub version: u64,
}

// ============================================================================
// STATE STORE TRAIT
// ============================================================================

/// Durable record store for rotation stream state.
///
/// Implementations must make `store` atomic per key: a write with a stale
/// `expected_version` fails with [`StorageError::VersionConflict`] instead of
/// clobbering a concurrent writer. This is the serialization point the whole
/// rotation engine leans on.
pub trait RotationStateStore: Send + Sync {
    /// Load the current record for a stream, if the stream has ever advanced.
    fn load(&self, key: &str) -> CarouselResult<Option<VersionedState>>;

    /// Atomically persist a record.
    ///
    /// `expected_version = None` creates the record and fails with
    /// `VersionConflict` if the key already exists; `Some(v)` replaces the
    /// record only while the stored version is still `v`. Returns the new
    /// version on success.
    fn store(
        &self,
        key: &str,
        expected_version: Option<u64>,
        state: RotationState,
    ) -> CarouselResult<u64>;

    /// Remove a record. Administrative use only; the engine itself never
    /// deletes state.
    fn remove(&self, key: &str) -> CarouselResult<bool>;

    /// List all stream keys with stored state.
    fn keys(&self) -> CarouselResult<Vec<String>>;
}

// ============================================================================
// IN-MEMORY STATE STORE
// ============================================================================

/// In-memory `RotationStateStore` for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    records: RwLock<HashMap<String, VersionedState>>,
}

impl InMemoryStateStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams with stored state.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether no stream has stored state yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RotationStateStore for InMemoryStateStore {
    fn load(&self, key: &str) -> CarouselResult<Option<VersionedState>> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.get(key).cloned())
    }

    fn store(
        &self,
        key: &str,
        expected_version: Option<u64>,
        state: RotationState,
    ) -> CarouselResult<u64> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;

        match (records.get(key), expected_version) {
            (None, None) => {
                records.insert(
                    key.to_string(),
                    VersionedState { state, version: 1 },
                );
                Ok(1)
            }
            (Some(existing), Some(expected)) if existing.version == expected => {
                let version = expected + 1;
                records.insert(key.to_string(), VersionedState { state, version });
                Ok(version)
            }
            _ => Err(StorageError::VersionConflict {
                key: key.to_string(),
                expected: expected_version,
            }
            .into()),
        }
    }

    fn remove(&self, key: &str) -> CarouselResult<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.remove(key).is_some())
    }

    fn keys(&self) -> CarouselResult<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.keys().cloned().collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
