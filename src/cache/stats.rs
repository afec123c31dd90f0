//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! speculative prefetch outcomes.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Requests answered from an active entry
    pub hits: u64,
    /// Requests that required a fresh computation
    pub misses: u64,
    /// Active entries evicted to respect capacity
    pub evictions: u64,
    /// Entries dropped because their age reached the TTL
    pub expirations: u64,
    /// Speculative windows computed and stored as pending-next
    pub prefetches: u64,
    /// Speculative computations that failed and were dropped
    pub prefetch_failures: u64,
    /// Pending-next entries promoted to active
    pub promotions: u64,
    /// Current number of active entries
    pub active_entries: usize,
    /// Current number of pending-next entries
    pub pending_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    pub fn record_prefetch(&mut self) {
        self.prefetches += 1;
    }

    pub fn record_prefetch_failure(&mut self) {
        self.prefetch_failures += 1;
    }

    pub fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    // == Update Entry Counts ==
    pub fn set_entry_counts(&mut self, active: usize, pending: usize) {
        self.active_entries = active;
        self.pending_entries = pending;
    }
}
