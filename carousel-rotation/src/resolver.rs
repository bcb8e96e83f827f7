//! Window resolution against the live catalog.
//!
//! The resolver is a stateless read: it recounts the eligible set on every
//! call and is the source of truth for *content*, while the rotation manager
//! is the source of truth for *position*. A stored offset that outgrew the
//! live set (entries deleted or aged out since the last advancement) is not
//! an error; it is folded back into range and the window is wrap-filled.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use carousel_core::{
    CarouselResult, ContentError, ContentWindow, EligibilityCriteria,
};
use carousel_storage::ContentSource;

/// Resolves ordered windows of eligible content with wraparound fill.
pub struct ContentWindowResolver {
    source: Arc<dyn ContentSource>,
    criteria: EligibilityCriteria,
}

impl ContentWindowResolver {
    /// Create a resolver over a content source.
    pub fn new(source: Arc<dyn ContentSource>, criteria: EligibilityCriteria) -> Self {
        Self { source, criteria }
    }

    /// The eligibility criteria this resolver applies.
    pub fn criteria(&self) -> &EligibilityCriteria {
        &self.criteria
    }

    /// Live count of currently-eligible entries.
    pub fn live_total(&self) -> CarouselResult<i64> {
        self.source.count_eligible(&self.criteria, Utc::now())
    }

    /// Resolve the window of `window_size` entries starting at `offset`.
    ///
    /// The offset is normalized into the live total, so stale or
    /// caller-supplied out-of-range offsets are safe. When the slice runs
    /// past the end of the ordering the remainder is filled from the start;
    /// within one response an entry id repeats only when the whole eligible
    /// set is smaller than the window.
    pub fn resolve(&self, offset: i64, window_size: i64) -> CarouselResult<ContentWindow> {
        if window_size <= 0 {
            return Err(ContentError::InvalidRequest {
                offset,
                limit: window_size,
            }
            .into());
        }

        let now = Utc::now();
        let total = self.source.count_eligible(&self.criteria, now)?;
        if total == 0 {
            return Ok(ContentWindow::empty());
        }

        let normalized = offset.rem_euclid(total);
        let mut items = self
            .source
            .fetch_window(&self.criteria, now, normalized, window_size)?;

        if (items.len() as i64) < window_size {
            if total >= window_size {
                // Fill the tail window from the start of the ordering. The
                // seen-set guards against the eligible set shifting between
                // the two fetches.
                let needed = window_size - items.len() as i64;
                let seen: HashSet<_> = items.iter().map(|entry| entry.entry_id).collect();
                let head = self.source.fetch_window(&self.criteria, now, 0, needed)?;
                for entry in head {
                    if (items.len() as i64) >= window_size {
                        break;
                    }
                    if !seen.contains(&entry.entry_id) {
                        items.push(entry);
                    }
                }
            } else {
                // Eligible set smaller than the window: repeat entries from
                // the start of the ordering until the page is full.
                let head = self.source.fetch_window(&self.criteria, now, 0, total)?;
                if !head.is_empty() {
                    let mut index = 0usize;
                    while (items.len() as i64) < window_size {
                        items.push(head[index % head.len()].clone());
                        index += 1;
                    }
                }
            }
        }

        Ok(ContentWindow {
            items,
            total,
            offset: normalized,
            has_more: total > window_size,
            next_offset: (normalized + window_size) % total,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use carousel_core::{CatalogEntry, EntryStatus};
    use carousel_storage::InMemoryCatalog;
    use uuid::Uuid;

    fn make_test_entry(title: &str, age_hours: i64) -> CatalogEntry {
        CatalogEntry {
            entry_id: Uuid::now_v7(),
            title: title.to_string(),
            status: EntryStatus::Published,
            published_at: Utc::now() - chrono::Duration::hours(age_hours),
            unit_count: 2,
            metadata: None,
        }
    }

    fn make_test_resolver(entry_count: usize) -> ContentWindowResolver {
        let catalog = InMemoryCatalog::new();
        for i in 0..entry_count {
            catalog.upsert(make_test_entry(&format!("entry-{i}"), i as i64));
        }
        ContentWindowResolver::new(Arc::new(catalog), EligibilityCriteria::default())
    }

    #[test]
    fn test_plain_window_mid_set() {
        let resolver = make_test_resolver(10);
        let window = resolver.resolve(3, 3).unwrap();

        assert_eq!(window.total, 10);
        assert_eq!(window.offset, 3);
        assert_eq!(window.items.len(), 3);
        assert!(window.has_more);
        assert_eq!(window.next_offset, 6);

        let titles: Vec<&str> = window.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["entry-3", "entry-4", "entry-5"]);
    }

    #[test]
    fn test_wrap_fill_at_tail() {
        // T=10, W=3, offset 9: one real item plus two wrapped from the top.
        let resolver = make_test_resolver(10);
        let window = resolver.resolve(9, 3).unwrap();

        let titles: Vec<&str> = window.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["entry-9", "entry-0", "entry-1"]);
        assert_eq!(window.next_offset, 2);
    }

    #[test]
    fn test_wrap_fill_never_duplicates_when_set_covers_window() {
        let resolver = make_test_resolver(10);
        for offset in 0..10 {
            let window = resolver.resolve(offset, 3).unwrap();
            let distinct: HashSet<_> =
                window.items.iter().map(|entry| entry.entry_id).collect();
            assert_eq!(distinct.len(), window.items.len(), "offset {offset}");
        }
    }

    #[test]
    fn test_window_larger_than_set_repeats_from_start() {
        // T=5, W=6: all five entries, then the newest again.
        let resolver = make_test_resolver(5);
        let window = resolver.resolve(0, 6).unwrap();

        assert_eq!(window.items.len(), 6);
        assert!(!window.has_more);
        let titles: Vec<&str> = window.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["entry-0", "entry-1", "entry-2", "entry-3", "entry-4", "entry-0"]
        );
        assert_eq!(window.next_offset, 1);
    }

    #[test]
    fn test_repetition_continues_the_ordering_mid_set() {
        let resolver = make_test_resolver(5);
        let window = resolver.resolve(2, 9).unwrap();

        let titles: Vec<&str> = window.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "entry-2", "entry-3", "entry-4", "entry-0", "entry-1", "entry-2", "entry-3",
                "entry-4", "entry-0"
            ]
        );
    }

    #[test]
    fn test_empty_set_resolves_to_empty_window() {
        let resolver = make_test_resolver(0);
        let window = resolver.resolve(0, 4).unwrap();
        assert!(window.items.is_empty());
        assert_eq!(window.total, 0);
        assert!(!window.has_more);
    }

    #[test]
    fn test_stale_offset_is_normalized() {
        // Offset persisted against a larger set folds back into range.
        let resolver = make_test_resolver(10);
        let window = resolver.resolve(23, 3).unwrap();
        assert_eq!(window.offset, 3);
        assert_eq!(window.items[0].title, "entry-3");
    }

    #[test]
    fn test_negative_offset_is_normalized() {
        let resolver = make_test_resolver(10);
        let window = resolver.resolve(-1, 3).unwrap();
        assert_eq!(window.offset, 9);
    }

    #[test]
    fn test_exact_boundary_window_has_no_fill() {
        let resolver = make_test_resolver(9);
        let window = resolver.resolve(6, 3).unwrap();
        let titles: Vec<&str> = window.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["entry-6", "entry-7", "entry-8"]);
        assert_eq!(window.next_offset, 0);
    }

    #[test]
    fn test_rejects_non_positive_window() {
        let resolver = make_test_resolver(5);
        assert!(resolver.resolve(0, 0).is_err());
        assert!(resolver.resolve(0, -2).is_err());
    }

    #[test]
    fn test_live_total_tracks_catalog() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let resolver = ContentWindowResolver::new(
            Arc::clone(&catalog) as Arc<dyn ContentSource>,
            EligibilityCriteria::default(),
        );
        assert_eq!(resolver.live_total().unwrap(), 0);

        catalog.upsert(make_test_entry("fresh", 1));
        assert_eq!(resolver.live_total().unwrap(), 1);
    }
}
