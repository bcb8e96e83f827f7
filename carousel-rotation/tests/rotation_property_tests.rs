//! Property-Based Tests for the Rotation Engine
//!
//! Property: for any eligible-set size T > 0 and window size W > 0, the
//! engine cycles through the whole set before repeating — after exactly
//! ceil(T/W) advancements beyond the first serve of offset 0, the stored
//! position returns to 0 with the cycle count incremented by one — and every
//! served offset stays inside [0, T). Windows resolved over a set at least
//! as large as the window never contain the same entry twice.

use std::sync::Arc;

use carousel_core::{
    ceil_div, CatalogEntry, EligibilityCriteria, EntryStatus, RetryConfig,
};
use carousel_rotation::{ContentWindowResolver, RotationManager};
use carousel_storage::{ContentSource, InMemoryCatalog, InMemoryStateStore};
use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

// ============================================================================
// FIXTURES
// ============================================================================

fn make_manager() -> RotationManager {
    RotationManager::new(
        Arc::new(InMemoryStateStore::new()),
        RetryConfig::default(),
    )
}

fn make_resolver(entry_count: i64) -> ContentWindowResolver {
    let catalog = InMemoryCatalog::new();
    for i in 0..entry_count {
        catalog.upsert(CatalogEntry {
            entry_id: Uuid::now_v7(),
            title: format!("entry-{i}"),
            status: EntryStatus::Published,
            published_at: Utc::now() - chrono::Duration::minutes(i),
            unit_count: 1,
            metadata: None,
        });
    }
    ContentWindowResolver::new(Arc::new(catalog), EligibilityCriteria::default())
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    /// Cycle closure: one full pass takes exactly ceil(T/W) advancements and
    /// increments the cycle count exactly once.
    #[test]
    fn prop_cycle_closure(total in 1i64..200, window in 1i64..20) {
        let manager = make_manager();

        // First call serves offset 0 and opens cycle 0.
        let first = manager.advance("stream", total, window).unwrap();
        prop_assert_eq!(first.offset, 0);
        prop_assert_eq!(first.cycle_info.cycle_count, 0);

        let pages = ceil_div(total, window);
        for call in 1..pages {
            let adv = manager.advance("stream", total, window).unwrap();
            prop_assert_eq!(adv.offset, call * window);
            prop_assert!(!adv.cycle_info.is_new_cycle);
        }

        // The stored position has wrapped: the next serve reopens at 0 with
        // the cycle count bumped exactly once.
        let snapshot = manager.stats("stream").unwrap().unwrap();
        prop_assert_eq!(snapshot.state.offset, 0);
        prop_assert_eq!(snapshot.state.cycle_count, 1);

        let reopened = manager.advance("stream", total, window).unwrap();
        prop_assert_eq!(reopened.offset, 0);
        prop_assert!(reopened.cycle_info.is_new_cycle);
        prop_assert_eq!(reopened.cycle_info.cycle_count, 1);
    }

    /// Offset bound: every served offset and every stored offset stays in
    /// [0, T) for as long as the set size holds.
    #[test]
    fn prop_offset_bound(total in 1i64..100, window in 1i64..20, calls in 1usize..40) {
        let manager = make_manager();
        for _ in 0..calls {
            let adv = manager.advance("stream", total, window).unwrap();
            prop_assert!(adv.offset >= 0);
            prop_assert!(adv.offset < total);

            let snapshot = manager.stats("stream").unwrap().unwrap();
            prop_assert!(snapshot.state.offset >= 0);
            prop_assert!(snapshot.state.offset < total);
        }
    }

    /// Serving windows across a whole cycle partitions the eligible set:
    /// remaining_items sums to T.
    #[test]
    fn prop_remaining_items_cover_the_set(total in 1i64..100, window in 1i64..20) {
        let manager = make_manager();
        let pages = ceil_div(total, window);
        let mut covered = 0;
        for _ in 0..pages {
            covered += manager.advance("stream", total, window).unwrap().remaining_items;
        }
        prop_assert_eq!(covered, total);
    }

    /// No duplicate ids within one resolved window when the set covers it.
    #[test]
    fn prop_wrap_fill_has_no_duplicates(total in 1i64..60, window in 1i64..16, offset in 0i64..200) {
        prop_assume!(total >= window);
        let resolver = make_resolver(total);

        let resolved = resolver.resolve(offset, window).unwrap();
        prop_assert_eq!(resolved.items.len() as i64, window);

        let distinct: std::collections::HashSet<_> =
            resolved.items.iter().map(|entry| entry.entry_id).collect();
        prop_assert_eq!(distinct.len(), resolved.items.len());
    }

    /// A window over a smaller set serves every eligible entry before any
    /// repetition.
    #[test]
    fn prop_small_set_serves_everything(total in 1i64..10, window in 1i64..16) {
        prop_assume!(total < window);
        let resolver = make_resolver(total);

        let resolved = resolver.resolve(0, window).unwrap();
        prop_assert_eq!(resolved.items.len() as i64, window);
        prop_assert!(!resolved.has_more);

        let distinct: std::collections::HashSet<_> =
            resolved.items.iter().map(|entry| entry.entry_id).collect();
        prop_assert_eq!(distinct.len() as i64, total);

        // The first `total` slots are exactly the eligible set.
        let head: std::collections::HashSet<_> = resolved.items[..total as usize]
            .iter()
            .map(|entry| entry.entry_id)
            .collect();
        prop_assert_eq!(head.len() as i64, total);
    }

    /// Resolver normalization agrees with the advertised next_offset: the
    /// next window starts where the previous one said it would.
    #[test]
    fn prop_next_offset_chains(total in 1i64..60, window in 1i64..16, offset in 0i64..200) {
        let resolver = make_resolver(total);

        let first = resolver.resolve(offset, window).unwrap();
        let second = resolver.resolve(first.next_offset, window).unwrap();
        prop_assert_eq!(second.offset, first.next_offset);
    }
}

// ============================================================================
// REGRESSION SCENARIOS
// ============================================================================

/// The documented walk of a ten-entry stream with a three-entry window.
#[test]
fn scenario_ten_by_three_walk() {
    let manager = make_manager();
    let resolver = make_resolver(10);

    let mut offsets = Vec::new();
    for _ in 0..5 {
        let adv = manager.advance("novelties", 10, 3).unwrap();
        offsets.push(adv.offset);

        let window = resolver.resolve(adv.offset, 3).unwrap();
        assert_eq!(window.items.len(), 3);
        if adv.offset == 9 {
            assert!(adv.needs_wrap_fill);
            assert_eq!(adv.remaining_items, 1);
            // One real item, two wrapped from the top of the ordering.
            assert_eq!(window.items[0].title, "entry-9");
            assert_eq!(window.items[1].title, "entry-0");
            assert_eq!(window.items[2].title, "entry-1");
        }
    }
    assert_eq!(offsets, vec![0, 3, 6, 9, 0]);
}

/// Five entries, six-slot window: everything is served, then repetition.
#[test]
fn scenario_window_larger_than_set() {
    let resolver = make_resolver(5);
    let window = resolver.resolve(0, 6).unwrap();

    assert_eq!(window.items.len(), 6);
    assert!(!window.has_more);
    assert_eq!(window.items[5].entry_id, window.items[0].entry_id);
}

/// An empty eligible set is served as an empty window and advances nothing.
#[test]
fn scenario_empty_set() {
    let manager = make_manager();
    let resolver = make_resolver(0);

    let adv = manager.advance("novelties", 0, 4).unwrap();
    assert_eq!(adv.offset, 0);
    assert_eq!(adv.cycle_info.cycle_count, 0);
    assert!(manager.stats("novelties").unwrap().is_none());

    let window = resolver.resolve(0, 4).unwrap();
    assert!(window.items.is_empty());
    assert!(!window.has_more);
}

/// Catalog churn between advancements: the engine keeps its position through
/// small drift and restarts through structural change.
#[test]
fn scenario_catalog_churn() {
    let catalog = Arc::new(InMemoryCatalog::new());
    for i in 0..10 {
        catalog.upsert(CatalogEntry {
            entry_id: Uuid::now_v7(),
            title: format!("entry-{i}"),
            status: EntryStatus::Published,
            published_at: Utc::now() - chrono::Duration::minutes(i),
            unit_count: 1,
            metadata: None,
        });
    }
    let resolver = ContentWindowResolver::new(
        Arc::clone(&catalog) as Arc<dyn ContentSource>,
        EligibilityCriteria::default(),
    );
    let manager = make_manager();

    let first = manager
        .advance("novelties", resolver.live_total().unwrap(), 3)
        .unwrap();
    assert_eq!(first.offset, 0);

    // One entry retires: drift within a window, position keeps stepping.
    let retired = resolver.resolve(0, 1).unwrap().items[0].entry_id;
    catalog.remove(retired);
    let second = manager
        .advance("novelties", resolver.live_total().unwrap(), 3)
        .unwrap();
    assert_eq!(second.offset, 3);
    assert!(!second.cycle_info.is_new_cycle);

    // A bulk publish lands: structural change, the cycle restarts.
    for i in 0..10 {
        catalog.upsert(CatalogEntry {
            entry_id: Uuid::now_v7(),
            title: format!("bulk-{i}"),
            status: EntryStatus::Published,
            published_at: Utc::now(),
            unit_count: 1,
            metadata: None,
        });
    }
    let third = manager
        .advance("novelties", resolver.live_total().unwrap(), 3)
        .unwrap();
    assert_eq!(third.offset, 0);
    assert!(third.cycle_info.is_new_cycle);
}
