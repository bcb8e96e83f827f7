//! Content source abstraction and in-memory catalog.
//!
//! The resolver treats the catalog as a queryable collection: count the
//! eligible entries, fetch an ordered slice. The live catalog is the source
//! of truth for content; rotation state only tracks position.

use std::collections::HashMap;
use std::sync::RwLock;

use carousel_core::{
    CarouselResult, CatalogEntry, ContentError, EligibilityCriteria, EntityId, Timestamp,
};

// ============================================================================
// CONTENT SOURCE TRAIT
// ============================================================================

/// Queryable collection of catalog entries.
///
/// `fetch_window` must use a stable freshness ordering (newest first, entry
/// id as tiebreak) so that successive windows of one cycle partition the
/// eligible set instead of shuffling it.
pub trait ContentSource: Send + Sync {
    /// Count entries eligible under `criteria` as of `now`.
    fn count_eligible(
        &self,
        criteria: &EligibilityCriteria,
        now: Timestamp,
    ) -> CarouselResult<i64>;

    /// Fetch up to `limit` eligible entries starting at `offset` in the
    /// freshness ordering. An offset at or past the end returns fewer (or
    /// zero) entries; it is not an error.
    fn fetch_window(
        &self,
        criteria: &EligibilityCriteria,
        now: Timestamp,
        offset: i64,
        limit: i64,
    ) -> CarouselResult<Vec<CatalogEntry>>;
}

// ============================================================================
// IN-MEMORY CATALOG
// ============================================================================

/// In-memory `ContentSource` for tests and single-process deployments.
///
/// In production the platform's catalog store stands behind the same trait;
/// this implementation keeps the ordering contract over a plain map.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: RwLock<HashMap<EntityId, CatalogEntry>>,
}

impl InMemoryCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn upsert(&self, entry: CatalogEntry) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(entry.entry_id, entry);
        }
    }

    /// Remove an entry, returning whether it existed.
    pub fn remove(&self, entry_id: EntityId) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(&entry_id).is_some())
            .unwrap_or(false)
    }

    /// Total entries in the catalog, eligible or not.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the catalog holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Eligible entries in freshness order (newest first, id tiebreak).
    fn eligible_sorted(
        &self,
        criteria: &EligibilityCriteria,
        now: Timestamp,
    ) -> CarouselResult<Vec<CatalogEntry>> {
        let entries = self.entries.read().map_err(|_| ContentError::QueryFailed {
            reason: "catalog lock poisoned".to_string(),
        })?;

        let mut eligible: Vec<CatalogEntry> = entries
            .values()
            .filter(|e| e.is_eligible(criteria, now))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.entry_id.cmp(&a.entry_id))
        });
        Ok(eligible)
    }
}

impl ContentSource for InMemoryCatalog {
    fn count_eligible(
        &self,
        criteria: &EligibilityCriteria,
        now: Timestamp,
    ) -> CarouselResult<i64> {
        Ok(self.eligible_sorted(criteria, now)?.len() as i64)
    }

    fn fetch_window(
        &self,
        criteria: &EligibilityCriteria,
        now: Timestamp,
        offset: i64,
        limit: i64,
    ) -> CarouselResult<Vec<CatalogEntry>> {
        if offset < 0 || limit < 0 {
            return Err(ContentError::InvalidRequest { offset, limit }.into());
        }

        Ok(self
            .eligible_sorted(criteria, now)?
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
