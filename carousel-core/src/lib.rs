//! Carousel Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod config;
pub mod content;
pub mod error;
pub mod state;

pub use config::{RetryConfig, RotationConfig};
pub use content::{CatalogEntry, ContentWindow, EligibilityCriteria, EntryStatus};
pub use error::{
    CarouselError, CarouselResult, ConfigError, ConfigResult, ContentError, RotationError,
    StorageError,
};
pub use state::{
    ceil_div, Advancement, CycleInfo, RotationMode, RotationSnapshot, RotationState,
};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
