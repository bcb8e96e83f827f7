//! Error types for Carousel operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Rotation state not found for stream \"{key}\"")]
    NotFound { key: String },

    #[error("Version conflict on stream \"{key}\": expected {expected:?}")]
    VersionConflict { key: String, expected: Option<u64> },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Rotation engine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RotationError {
    #[error("Window size must be positive, got {window_size}")]
    InvalidWindow { window_size: i64 },

    #[error("Total items must be non-negative, got {total_items}")]
    InvalidTotal { total_items: i64 },

    #[error("Advancement on stream \"{key}\" lost {attempts} consecutive version races")]
    ContentionExhausted { key: String, attempts: u32 },
}

/// Content query errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Content query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Invalid window request: offset {offset}, limit {limit}")]
    InvalidRequest { offset: i64, limit: i64 },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Carousel errors.
#[derive(Debug, Clone, Error)]
pub enum CarouselError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Rotation error: {0}")]
    Rotation(#[from] RotationError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Carousel operations.
pub type CarouselResult<T> = Result<T, CarouselError>;

/// Result type alias for configuration validation.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// TESTS
// =============================================================================
