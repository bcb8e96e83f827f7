//! Short-TTL window cache.
//!
//! Absorbs request bursts in front of the content resolver. The cache is
//! process-local and explicitly constructed: it is built once per process
//! and injected by reference, never reached through a global. Expired
//! entries are treated as absent on read; a periodic [`WindowCache::purge_expired`]
//! sweep is optional and only reclaims memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use carousel_core::{ConfigError, ConfigResult, RotationMode, Timestamp};
use chrono::{DateTime, Utc};

/// Cache key for a resolved window.
///
/// Deterministically derived from the rotation mode, offset, and window
/// size, so identical requests within one TTL share an entry.
pub fn window_key(mode: RotationMode, offset: i64, window_size: i64) -> String {
    format!("window:{}:{}:{}", mode.as_str(), offset, window_size)
}

// ============================================================================
// CONFIG
// ============================================================================

/// Configuration for the window cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL applied when `set` is called without an explicit one.
    pub default_ttl: Duration,
    /// Maximum number of live entries; at capacity the soonest-expiring
    /// entry is evicted.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            max_entries: 1024,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default TTL.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the max entry count.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_ttl.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "default_ttl".to_string(),
                value: format!("{:?}", self.default_ttl),
                reason: "default_ttl must be positive".to_string(),
            });
        }

        if self.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_entries".to_string(),
                value: "0".to_string(),
                reason: "max_entries must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// STATS
// ============================================================================

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of live (unexpired) entries.
    pub entry_count: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// WINDOW CACHE
// ============================================================================

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    expires_at: Timestamp,
}

/// Process-local TTL cache for resolved windows.
///
/// Every operation is infallible from the caller's point of view: a poisoned
/// lock degrades to a miss or a no-op, because the cache is an optimization
/// and must never fail a request.
#[derive(Debug, Default)]
pub struct WindowCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl WindowCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a cache with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a value. Expired entries count as misses and are dropped.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let now = Utc::now();
        {
            let Ok(entries) = self.entries.read() else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            };
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(entry.value.clone());
                }
                Some(_) => {} // expired, drop below
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        if let Ok(mut entries) = self.entries.write() {
            if entries.get(key).is_some_and(|e| e.expires_at <= now) {
                entries.remove(key);
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value under `key` for `ttl` (the configured default when
    /// `None`). At capacity, the soonest-expiring entry is evicted first.
    pub fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let lifetime = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        if !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            let victim = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(victim) = victim {
                entries.remove(&victim);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Remove one entry, returning whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Remove entries whose key starts with `pattern`, or all entries when
    /// no pattern is given. Returns the number removed.
    pub fn clear(&self, pattern: Option<&str>) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        match pattern {
            None => {
                let removed = entries.len();
                entries.clear();
                removed
            }
            Some(prefix) => {
                let before = entries.len();
                entries.retain(|key, _| !key.starts_with(prefix));
                before - entries.len()
            }
        }
    }

    /// Drop expired entries, returning the number reclaimed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries
            .read()
            .map(|entries| {
                entries
                    .values()
                    .filter(|entry| entry.expires_at > now)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Whether the cache holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of usage counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.len() as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
