//! Catalog entry types and eligibility rules.
//!
//! Entries are resolved fresh on every window fetch; this subsystem never
//! persists them. The catalog itself lives behind the `ContentSource`
//! abstraction in the storage crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ConfigError, ConfigResult, EntityId, Timestamp};

/// Publication status of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntryStatus {
    Published,
    Completed,
    Hiatus,
    Draft,
    Retired,
}

/// One entry of the content catalog (a series, title, or collection).
///
/// `unit_count` is the number of readable sub-units (chapters/episodes) the
/// entry currently carries; eligibility requires at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogEntry {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub entry_id: EntityId,
    pub title: String,
    pub status: EntryStatus,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub published_at: Timestamp,
    pub unit_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub metadata: Option<serde_json::Value>,
}

impl CatalogEntry {
    /// Whether this entry qualifies for the rotation under `criteria` as of
    /// `now`: fresh enough, allowed status, and at least `min_units`
    /// readable sub-units.
    pub fn is_eligible(&self, criteria: &EligibilityCriteria, now: DateTime<Utc>) -> bool {
        // A window too large to represent accepts everything.
        let horizon = chrono::Duration::from_std(criteria.freshness_window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.published_at >= horizon
            && criteria.allowed_statuses.contains(&self.status)
            && self.unit_count >= criteria.min_units
    }
}

/// Predicate defining the eligible set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EligibilityCriteria {
    /// Trailing freshness window in nanoseconds.
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub freshness_window: Duration,
    pub allowed_statuses: Vec<EntryStatus>,
    /// Minimum readable sub-units for an entry to qualify.
    pub min_units: i64,
}

impl Default for EligibilityCriteria {
    fn default() -> Self {
        Self {
            // 30 days of novelty
            freshness_window: Duration::from_secs(30 * 24 * 3600),
            allowed_statuses: vec![EntryStatus::Published, EntryStatus::Completed],
            min_units: 1,
        }
    }
}

impl EligibilityCriteria {
    /// Validate the criteria.
    /// Returns Ok(()) if valid, Err(ConfigError) if invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.freshness_window.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "freshness_window".to_string(),
                value: format!("{:?}", self.freshness_window),
                reason: "freshness_window must be positive".to_string(),
            });
        }

        if self.allowed_statuses.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "allowed_statuses".to_string(),
                value: "[]".to_string(),
                reason: "at least one status must be allowed".to_string(),
            });
        }

        if self.min_units < 1 {
            return Err(ConfigError::InvalidValue {
                field: "min_units".to_string(),
                value: self.min_units.to_string(),
                reason: "min_units must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Ordered slice of eligible content returned to one caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ContentWindow {
    pub items: Vec<CatalogEntry>,
    /// Live count of currently-eligible entries.
    pub total: i64,
    /// Normalized offset the window was served at.
    pub offset: i64,
    /// Whether the eligible set is larger than one window.
    pub has_more: bool,
    /// Offset a manual caller would pass to continue from this window.
    pub next_offset: i64,
}

impl ContentWindow {
    /// An empty window over an empty eligible set.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            offset: 0,
            has_more: false,
            next_offset: 0,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_test_entry(status: EntryStatus, age_days: i64, unit_count: i64) -> CatalogEntry {
        CatalogEntry {
            entry_id: Uuid::now_v7(),
            title: "Test Entry".to_string(),
            status,
            published_at: Utc::now() - chrono::Duration::days(age_days),
            unit_count,
            metadata: None,
        }
    }

    #[test]
    fn test_fresh_published_entry_is_eligible() {
        let criteria = EligibilityCriteria::default();
        let entry = make_test_entry(EntryStatus::Published, 3, 5);
        assert!(entry.is_eligible(&criteria, Utc::now()));
    }

    #[test]
    fn test_stale_entry_is_not_eligible() {
        let criteria = EligibilityCriteria::default();
        let entry = make_test_entry(EntryStatus::Published, 45, 5);
        assert!(!entry.is_eligible(&criteria, Utc::now()));
    }

    #[test]
    fn test_disallowed_status_is_not_eligible() {
        let criteria = EligibilityCriteria::default();
        let draft = make_test_entry(EntryStatus::Draft, 1, 5);
        let retired = make_test_entry(EntryStatus::Retired, 1, 5);
        assert!(!draft.is_eligible(&criteria, Utc::now()));
        assert!(!retired.is_eligible(&criteria, Utc::now()));
    }

    #[test]
    fn test_entry_without_units_is_not_eligible() {
        let criteria = EligibilityCriteria::default();
        let entry = make_test_entry(EntryStatus::Published, 1, 0);
        assert!(!entry.is_eligible(&criteria, Utc::now()));
    }

    #[test]
    fn test_criteria_validate_rejects_zero_window() {
        let criteria = EligibilityCriteria {
            freshness_window: Duration::ZERO,
            ..EligibilityCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_criteria_validate_rejects_empty_statuses() {
        let criteria = EligibilityCriteria {
            allowed_statuses: Vec::new(),
            ..EligibilityCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_criteria_validate_rejects_zero_min_units() {
        let criteria = EligibilityCriteria {
            min_units: 0,
            ..EligibilityCriteria::default()
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_default_criteria_is_valid() {
        assert!(EligibilityCriteria::default().validate().is_ok());
    }

    #[test]
    fn test_empty_window() {
        let window = ContentWindow::empty();
        assert!(window.items.is_empty());
        assert_eq!(window.total, 0);
        assert!(!window.has_more);
        assert_eq!(window.next_offset, 0);
    }
}
