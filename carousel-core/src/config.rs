//! Configuration types
//!
//! Rotation parameters are explicit, validated structs constructed once at
//! startup — nothing is inferred per call.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{ConfigError, ConfigResult};

/// Rotation feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RotationConfig {
    /// Stream key the feed rotates under.
    pub stream_key: String,
    /// Default window size when the caller does not supply a limit.
    pub window_size: i64,
    /// Hard cap on caller-supplied limits.
    pub max_window_size: i64,
    /// TTL for cached resolver results in nanoseconds.
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub cache_ttl: Duration,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            stream_key: "novelties".to_string(),
            window_size: 4,
            max_window_size: 12,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl RotationConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stream key.
    pub fn with_stream_key(mut self, key: impl Into<String>) -> Self {
        self.stream_key = key.into();
        self
    }

    /// Set the default window size.
    pub fn with_window_size(mut self, window_size: i64) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the maximum window size.
    pub fn with_max_window_size(mut self, max: i64) -> Self {
        self.max_window_size = max;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `CAROUSEL_STREAM_KEY`: Stream key for the feed (default: "novelties")
    /// - `CAROUSEL_WINDOW_SIZE`: Default window size (default: 4)
    /// - `CAROUSEL_MAX_WINDOW_SIZE`: Window size cap (default: 12)
    /// - `CAROUSEL_CACHE_TTL_SECS`: Cache TTL in seconds (default: 300)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            stream_key: std::env::var("CAROUSEL_STREAM_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.stream_key),
            window_size: std::env::var("CAROUSEL_WINDOW_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.window_size),
            max_window_size: std::env::var("CAROUSEL_MAX_WINDOW_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_window_size),
            cache_ttl: std::env::var("CAROUSEL_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
        }
    }

    /// Validate the configuration.
    /// Returns Ok(()) if valid, Err(ConfigError) if invalid.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.stream_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "stream_key".to_string(),
            });
        }

        if self.window_size <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "window_size".to_string(),
                value: self.window_size.to_string(),
                reason: "window_size must be greater than 0".to_string(),
            });
        }

        if self.max_window_size < self.window_size {
            return Err(ConfigError::InvalidValue {
                field: "max_window_size".to_string(),
                value: self.max_window_size.to_string(),
                reason: "max_window_size must be at least window_size".to_string(),
            });
        }

        if self.cache_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "cache_ttl".to_string(),
                value: format!("{:?}", self.cache_ttl),
                reason: "cache_ttl must be positive".to_string(),
            });
        }

        Ok(())
    }
}

/// Retry configuration for contended advancement writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RetryConfig {
    pub max_retries: i32,
    /// Initial backoff duration in nanoseconds
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub initial_backoff: Duration,
    /// Maximum backoff duration in nanoseconds
    #[cfg_attr(feature = "openapi", schema(value_type = u64))]
    pub max_backoff: Duration,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(50),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_retries < 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries".to_string(),
                value: self.max_retries.to_string(),
                reason: "max_retries must be non-negative".to_string(),
            });
        }

        if self.backoff_multiplier <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff_multiplier".to_string(),
                value: self.backoff_multiplier.to_string(),
                reason: "backoff_multiplier must be positive".to_string(),
            });
        }

        Ok(())
    }

    /// Backoff to apply before the given retry attempt (0-based), capped at
    /// `max_backoff`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let scaled = self.initial_backoff.as_secs_f32() * factor;
        match Duration::try_from_secs_f32(scaled) {
            Ok(backoff) => backoff.min(self.max_backoff),
            Err(_) => self.max_backoff,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
