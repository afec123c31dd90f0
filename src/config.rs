//! Configuration Module
//!
//! Loads server and cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, EvictionPolicy};

/// Server configuration parameters.
///
/// All values can be configured via environment variables; unparseable values
/// fall back to the defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of active cache entries
    pub max_entries: usize,
    /// Entry time-to-live in seconds
    pub cache_ttl: u64,
    /// Victim selection when the cache is full
    pub eviction_policy: EvictionPolicy,
    /// Requested duration is multiplied by this when computing a window
    pub prefetch_multiplier: f64,
    /// Upper bound on a computed window's duration in seconds
    pub max_window_duration: f64,
    /// Upper bound on a computed window's sample count
    pub max_window_samples: usize,
    /// Window consumption fraction that triggers a prefetch
    pub auto_prefetch_threshold: f64,
    /// Requests shorter than this (seconds) are computed without inflation
    pub min_inflation_duration: f64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Reference epoch of the element catalog, in seconds
    pub epoch_seconds: f64,
    /// JSON element catalog; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum active entries (default: 256)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 300)
    /// - `EVICTION_POLICY` - `lru`, `lfu` or `fifo` (default: lru)
    /// - `PREFETCH_MULTIPLIER` - Window inflation factor (default: 4.0)
    /// - `MAX_WINDOW_DURATION` - Window duration cap in seconds (default: 86400)
    /// - `MAX_WINDOW_SAMPLES` - Window sample cap (default: 100000)
    /// - `AUTO_PREFETCH_THRESHOLD` - Prefetch trigger fraction (default: 0.75)
    /// - `MIN_INFLATION_DURATION` - Shortest inflated request in seconds (default: 1.0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 5)
    /// - `EPOCH_SECONDS` - Catalog reference epoch (default: 0)
    /// - `CATALOG_PATH` - Optional JSON catalog file
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            eviction_policy: env_or("EVICTION_POLICY", defaults.eviction_policy),
            prefetch_multiplier: env_or("PREFETCH_MULTIPLIER", defaults.prefetch_multiplier),
            max_window_duration: env_or("MAX_WINDOW_DURATION", defaults.max_window_duration),
            max_window_samples: env_or("MAX_WINDOW_SAMPLES", defaults.max_window_samples),
            auto_prefetch_threshold: env_or(
                "AUTO_PREFETCH_THRESHOLD",
                defaults.auto_prefetch_threshold,
            ),
            min_inflation_duration: env_or(
                "MIN_INFLATION_DURATION",
                defaults.min_inflation_duration,
            ),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            epoch_seconds: env_or("EPOCH_SECONDS", defaults.epoch_seconds),
            catalog_path: env::var("CATALOG_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Cache tuning derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_entries: self.max_entries,
            ttl: Duration::from_secs(self.cache_ttl),
            eviction_policy: self.eviction_policy,
            prefetch_multiplier: self.prefetch_multiplier,
            max_window_duration_s: self.max_window_duration,
            max_window_samples: self.max_window_samples,
            auto_prefetch_threshold: self.auto_prefetch_threshold,
            min_inflation_duration_s: self.min_inflation_duration,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 256,
            cache_ttl: 300,
            eviction_policy: EvictionPolicy::Lru,
            prefetch_multiplier: 4.0,
            max_window_duration: 86_400.0,
            max_window_samples: 100_000,
            auto_prefetch_threshold: 0.75,
            min_inflation_duration: 1.0,
            server_port: 3000,
            cleanup_interval: 5,
            epoch_seconds: 0.0,
            catalog_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 256);
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.eviction_policy, EvictionPolicy::Lru);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 5);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_cache_config_matches_cache_defaults() {
        let derived = Config::default().cache_config();
        let cache_default = CacheConfig::default();
        assert_eq!(derived.max_entries, cache_default.max_entries);
        assert_eq!(derived.ttl, cache_default.ttl);
        assert_eq!(derived.eviction_policy, cache_default.eviction_policy);
        assert_eq!(derived.prefetch_multiplier, cache_default.prefetch_multiplier);
        assert_eq!(derived.max_window_duration_s, cache_default.max_window_duration_s);
        assert_eq!(derived.max_window_samples, cache_default.max_window_samples);
        assert_eq!(derived.auto_prefetch_threshold, cache_default.auto_prefetch_threshold);
        assert_eq!(derived.min_inflation_duration_s, cache_default.min_inflation_duration_s);
    }

    #[test]
    fn test_env_or_parsing() {
        // Variable names unique to this test so parallel tests don't race
        env::set_var("ORBIT_CACHE_TEST_POLICY", " FIFO ");
        env::set_var("ORBIT_CACHE_TEST_BAD_NUMBER", "lots");
        env::remove_var("ORBIT_CACHE_TEST_MISSING");

        assert_eq!(
            env_or("ORBIT_CACHE_TEST_POLICY", EvictionPolicy::Lru),
            EvictionPolicy::Fifo
        );
        assert_eq!(env_or("ORBIT_CACHE_TEST_BAD_NUMBER", 7usize), 7);
        assert_eq!(env_or("ORBIT_CACHE_TEST_MISSING", 1.5f64), 1.5);
    }
}
