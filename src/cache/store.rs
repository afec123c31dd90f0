//! Cache Store Module
//!
//! Main cache engine: per-(object, frequency) active windows, pending-next
//! windows from speculative prefetch, TTL expiration and policy-driven eviction.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy, EvictionTracker, SampleWindow, TimedSample};
use crate::error::{OrbitError, Result};

// == Cache Config ==
/// Tuning knobs for [`TransformCache`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of active entries
    pub max_entries: usize,
    /// Age at which an entry expires
    pub ttl: Duration,
    /// Victim selection when capacity is exceeded
    pub eviction_policy: EvictionPolicy,
    /// Factor by which a requested duration is inflated on computation
    pub prefetch_multiplier: f64,
    /// Upper bound on an inflated window's duration (seconds)
    pub max_window_duration_s: f64,
    /// Upper bound on an inflated window's sample count
    pub max_window_samples: usize,
    /// Consumption fraction at which the following window is prefetched
    pub auto_prefetch_threshold: f64,
    /// Requests shorter than this (seconds) are computed without inflation
    pub min_inflation_duration_s: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl: Duration::from_secs(300),
            eviction_policy: EvictionPolicy::Lru,
            prefetch_multiplier: 4.0,
            max_window_duration_s: 86_400.0,
            max_window_samples: 100_000,
            auto_prefetch_threshold: 0.75,
            min_inflation_duration_s: 1.0,
        }
    }
}

// == Keys ==
/// Cache partition: one object sampled at one frequency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub object_id: String,
    frequency_bits: u64,
}

impl CacheKey {
    pub fn new(object_id: impl Into<String>, frequency_hz: f64) -> Self {
        Self {
            object_id: object_id.into(),
            // Normalize -0.0 so equal frequencies hash alike
            frequency_bits: (frequency_hz + 0.0).to_bits(),
        }
    }

    pub fn frequency_hz(&self) -> f64 {
        f64::from_bits(self.frequency_bits)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}Hz", self.object_id, self.frequency_hz())
    }
}

/// In-flight/completed marker for one speculative window, identified by the
/// window's end time (milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrefetchKey {
    key: CacheKey,
    window_end_ms: i64,
}

impl PrefetchKey {
    pub fn new(key: &CacheKey, window_end_s: f64) -> Self {
        Self {
            key: key.clone(),
            window_end_ms: millis(window_end_s),
        }
    }
}

/// Time in whole milliseconds, the resolution at which window bounds compare.
fn millis(time_s: f64) -> i64 {
    (time_s * 1000.0).round() as i64
}

// == Window Query ==
/// A request for samples of one object over `[start_s, start_s + duration_s)`.
///
/// `fingerprint` identifies the inputs behind the samples. Cached windows
/// computed under a different fingerprint are never served for the query.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowQuery {
    pub object_id: String,
    pub start_s: f64,
    pub duration_s: f64,
    pub frequency_hz: f64,
    pub fingerprint: u64,
}

impl WindowQuery {
    pub fn new(object_id: impl Into<String>, start_s: f64, duration_s: f64, frequency_hz: f64) -> Self {
        Self {
            object_id: object_id.into(),
            start_s,
            duration_s,
            frequency_hz,
            fingerprint: 0,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    /// Rejects malformed queries. A non-positive duration cannot produce any
    /// sample and is a computation failure rather than a malformed request.
    pub fn validate(&self) -> Result<()> {
        if !(self.frequency_hz > 0.0 && self.frequency_hz.is_finite()) {
            return Err(OrbitError::InvalidRequest(format!(
                "sampling frequency must be positive, got {}",
                self.frequency_hz
            )));
        }
        if !self.start_s.is_finite() || !self.duration_s.is_finite() {
            return Err(OrbitError::InvalidRequest(
                "start time and duration must be finite".to_string(),
            ));
        }
        if self.duration_s <= 0.0 {
            return Err(OrbitError::ComputationFailure(format!(
                "duration {}s yields no samples",
                self.duration_s
            )));
        }
        Ok(())
    }

    /// Rejects queries larger than any window the cache may hold.
    pub fn check_limits(&self, config: &CacheConfig) -> Result<()> {
        if self.duration_s > config.max_window_duration_s {
            return Err(OrbitError::InvalidRequest(format!(
                "duration {}s exceeds the {}s window limit",
                self.duration_s, config.max_window_duration_s
            )));
        }
        let samples = SampleWindow::new(self.start_s, self.duration_s, self.sampling_interval_s())
            .sample_count();
        if samples > config.max_window_samples {
            return Err(OrbitError::InvalidRequest(format!(
                "{} samples requested, limit is {}",
                samples, config.max_window_samples
            )));
        }
        Ok(())
    }

    pub fn sampling_interval_s(&self) -> f64 {
        1.0 / self.frequency_hz
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.object_id.clone(), self.frequency_hz)
    }
}

// == Transform Cache ==
/// Cache of sample windows keyed by (object, frequency).
///
/// Holds at most one active and one pending-next entry per key. All work,
/// including speculative prefetch, runs synchronously on the calling path.
#[derive(Debug)]
pub struct TransformCache<T> {
    config: CacheConfig,
    active: HashMap<CacheKey, CacheEntry<T>>,
    pending: HashMap<CacheKey, CacheEntry<T>>,
    tracker: EvictionTracker<CacheKey>,
    in_flight: HashSet<PrefetchKey>,
    completed: HashSet<PrefetchKey>,
    stats: CacheStats,
}

impl<T: TimedSample> TransformCache<T> {
    // == Constructor ==
    /// Creates an empty cache. A zero `max_entries` is raised to one.
    pub fn new(mut config: CacheConfig) -> Self {
        config.max_entries = config.max_entries.max(1);
        Self {
            config,
            active: HashMap::new(),
            pending: HashMap::new(),
            tracker: EvictionTracker::new(),
            in_flight: HashSet::new(),
            completed: HashSet::new(),
            stats: CacheStats::new(),
        }
    }

    // == Get Transforms ==
    /// Returns the samples covering `query`, computing through `compute` only
    /// for windows not already cached.
    ///
    /// `compute` receives the (possibly inflated) window to produce. An empty
    /// result fails the call and nothing is stored.
    pub fn get_transforms<F>(&mut self, query: &WindowQuery, mut compute: F) -> Result<Vec<T>>
    where
        F: FnMut(&SampleWindow) -> Result<Vec<T>>,
    {
        query.validate()?;
        query.check_limits(&self.config)?;
        let key = query.cache_key();

        self.promote_pending(&key, query);

        if let Some(samples) = self.lookup(&key, query) {
            debug!(key = %key, start = query.start_s, count = samples.len(), "cache hit");
            self.maybe_prefetch(&key, query, &mut compute);
            return Ok(samples);
        }

        self.stats.record_miss();
        let window = self.inflated_window(query.start_s, query.duration_s, query.sampling_interval_s());
        debug!(
            key = %key,
            start = window.start_s,
            duration = window.duration_s,
            "cache miss, computing window"
        );

        let samples = compute(&window)?;
        if samples.is_empty() {
            return Err(OrbitError::ComputationFailure(format!(
                "no samples computed for {} over [{}, {})",
                key,
                window.start_s,
                window.end_s()
            )));
        }

        let entry = CacheEntry::new(window, samples).with_fingerprint(query.fingerprint);
        let result = entry.extract(query.start_s, query.duration_s);
        self.insert_active(key, entry);
        non_empty(result, query)
    }

    // == Inflated Window ==
    /// Window computed for a request of `requested_s` seconds starting at `start_s`.
    ///
    /// The duration is multiplied by the prefetch multiplier and capped by the
    /// configured maximum duration and sample count, but never shrinks below
    /// the request. Requests under the inflation floor are left as-is.
    pub fn inflated_window(&self, start_s: f64, requested_s: f64, interval_s: f64) -> SampleWindow {
        let duration = if requested_s < self.config.min_inflation_duration_s {
            requested_s
        } else {
            let cap = self
                .config
                .max_window_duration_s
                .min(self.config.max_window_samples as f64 * interval_s);
            (requested_s * self.config.prefetch_multiplier)
                .min(cap)
                .max(requested_s)
        };
        SampleWindow::new(start_s, duration, interval_s)
    }

    // == Lookup ==
    /// Serves `query` from the active entry if it is fresh and covers the range.
    fn lookup(&mut self, key: &CacheKey, query: &WindowQuery) -> Option<Vec<T>> {
        if self.active.get(key)?.is_expired(self.config.ttl) {
            debug!(key = %key, "active entry expired");
            self.remove_active(key);
            self.drop_pending(key);
            self.stats.record_expiration();
            return None;
        }

        let entry = self.active.get_mut(key)?;
        if entry.fingerprint != query.fingerprint {
            debug!(key = %key, "cached window computed from other inputs");
            return None;
        }
        if !entry.covers(query.start_s, query.duration_s) {
            return None;
        }

        // Inside the tolerance band but between cached samples: recompute
        let samples = entry.extract(query.start_s, query.duration_s);
        if samples.is_empty() {
            return None;
        }

        entry.touch();
        self.tracker.touch(key);
        self.stats.record_hit();
        Some(samples)
    }

    // == Promotion ==
    /// Replaces the active entry with the pending-next one once the request
    /// start reaches the pending window. A pending window computed from other
    /// inputs is discarded instead.
    fn promote_pending(&mut self, key: &CacheKey, query: &WindowQuery) {
        let Some(pending) = self.pending.get(key) else {
            return;
        };
        if pending.fingerprint != query.fingerprint {
            debug!(key = %key, "discarding pending window computed from other inputs");
            self.drop_pending(key);
            return;
        }
        if query.start_s < pending.window.start_s {
            return;
        }

        if let Some(entry) = self.pending.remove(key) {
            self.clear_markers(key, &entry.window);
            debug!(key = %key, start = entry.window.start_s, "promoting prefetched window");
            self.insert_active(key.clone(), entry);
            self.stats.record_promotion();
        }
    }

    // == Prefetch ==
    /// Computes the following window once enough of the active one is consumed.
    ///
    /// Runs at most once per following window; failures are logged and dropped
    /// so that a later call may retry.
    fn maybe_prefetch<F>(&mut self, key: &CacheKey, query: &WindowQuery, compute: &mut F)
    where
        F: FnMut(&SampleWindow) -> Result<Vec<T>>,
    {
        let Some(entry) = self.active.get(key) else {
            return;
        };
        if entry.consumption(query.start_s, query.duration_s) < self.config.auto_prefetch_threshold {
            return;
        }

        let next_start = entry.window.end_s();
        let next = self.inflated_window(next_start, query.duration_s, query.sampling_interval_s());
        let marker = PrefetchKey::new(key, next.end_s());
        if self.in_flight.contains(&marker) || self.completed.contains(&marker) {
            return;
        }
        let already_pending = self
            .pending
            .get(key)
            .is_some_and(|p| millis(p.window.start_s) == millis(next_start));
        if already_pending {
            return;
        }

        self.in_flight.insert(marker.clone());
        info!(
            key = %key,
            start = next.start_s,
            duration = next.duration_s,
            "prefetching next window"
        );

        let outcome = compute(&next).and_then(|samples| {
            if samples.is_empty() {
                Err(OrbitError::ComputationFailure(format!(
                    "prefetch for {} produced no samples",
                    key
                )))
            } else {
                Ok(samples)
            }
        });
        self.in_flight.remove(&marker);

        match outcome {
            Ok(samples) => {
                self.drop_pending(key);
                let entry = CacheEntry::new(next, samples).with_fingerprint(query.fingerprint);
                self.pending.insert(key.clone(), entry);
                self.completed.insert(marker);
                self.stats.record_prefetch();
            }
            Err(err) => {
                warn!(key = %key, error = %err, "prefetch failed");
                self.stats.record_prefetch_failure();
            }
        }
    }

    // == Storage Helpers ==
    fn insert_active(&mut self, key: CacheKey, entry: CacheEntry<T>) {
        if !self.contains(&key) && self.len() >= self.config.max_entries {
            self.evict_one();
        }

        // A pending window only stays valid if it continues the new active one
        let end = entry.window.end_s();
        let continues = self.pending.get(&key).is_some_and(|p| {
            millis(p.window.start_s) == millis(end) && p.fingerprint == entry.fingerprint
        });
        if !continues {
            self.drop_pending(&key);
        }

        self.active.insert(key.clone(), entry);
        self.tracker.insert(key);
    }

    fn evict_one(&mut self) {
        let active = &self.active;
        let victim = self
            .tracker
            .select_victim(self.config.eviction_policy, |k| {
                active.get(k).map_or(0, |e| e.access_count)
            });

        if let Some(victim) = victim {
            debug!(key = %victim, policy = %self.config.eviction_policy, "evicting entry");
            self.remove_active(&victim);
            self.drop_pending(&victim);
            self.stats.record_eviction();
        }
    }

    fn remove_active(&mut self, key: &CacheKey) {
        self.active.remove(key);
        self.tracker.remove(key);
    }

    fn drop_pending(&mut self, key: &CacheKey) {
        if let Some(entry) = self.pending.remove(key) {
            self.clear_markers(key, &entry.window);
        }
    }

    fn clear_markers(&mut self, key: &CacheKey, window: &SampleWindow) {
        let marker = PrefetchKey::new(key, window.end_s());
        self.in_flight.remove(&marker);
        self.completed.remove(&marker);
    }

    // == Cleanup Expired ==
    /// Removes all expired active and pending entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let ttl = self.config.ttl;
        let expired_active: Vec<CacheKey> = self
            .active
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();
        let expired_pending: Vec<CacheKey> = self
            .pending
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_active.len() + expired_pending.len();
        for key in expired_active {
            self.remove_active(&key);
            self.stats.record_expiration();
        }
        for key in expired_pending {
            self.drop_pending(&key);
            self.stats.record_expiration();
        }
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entry_counts(self.len(), self.pending_len());
        stats
    }

    // == Introspection ==
    /// Number of active entries.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.active.contains_key(key)
    }
}

#[cfg(test)]
impl<T: TimedSample> TransformCache<T> {
    /// Window of the active entry for `key`.
    pub fn active_window(&self, key: &CacheKey) -> Option<SampleWindow> {
        self.active.get(key).map(|e| e.window)
    }

    /// Window of the pending-next entry for `key`.
    pub fn pending_window(&self, key: &CacheKey) -> Option<SampleWindow> {
        self.pending.get(key).map(|e| e.window)
    }
}

fn non_empty<T>(samples: Vec<T>, query: &WindowQuery) -> Result<Vec<T>> {
    if samples.is_empty() {
        Err(OrbitError::ComputationFailure(format!(
            "no samples for {} in [{}, {})",
            query.object_id,
            query.start_s,
            query.start_s + query.duration_s
        )))
    } else {
        Ok(samples)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::{counting_compute, failing_compute, Tick};
    use std::cell::Cell;
    use std::thread::sleep;

    fn config(max_entries: usize) -> CacheConfig {
        CacheConfig {
            max_entries,
            ttl: Duration::from_secs(300),
            eviction_policy: EvictionPolicy::Lru,
            prefetch_multiplier: 2.0,
            max_window_duration_s: 1_000.0,
            max_window_samples: 10_000,
            auto_prefetch_threshold: 0.5,
            min_inflation_duration_s: 1.0,
        }
    }

    fn times(samples: &[Tick]) -> Vec<f64> {
        samples.iter().map(|t| t.time_s).collect()
    }

    fn fetch(cache: &mut TransformCache<Tick>, calls: &Cell<usize>, id: &str, start: f64, duration: f64) -> Vec<Tick> {
        cache
            .get_transforms(&WindowQuery::new(id, start, duration, 1.0), counting_compute(calls))
            .unwrap()
    }

    #[test]
    fn test_miss_computes_inflated_window() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);

        let samples = fetch(&mut cache, &calls, "earth", 0.0, 10.0);
        assert_eq!(times(&samples), (0..10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(calls.get(), 1);

        let key = CacheKey::new("earth", 1.0);
        assert_eq!(cache.active_window(&key), Some(SampleWindow::new(0.0, 20.0, 1.0)));
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_subrange_hit_matches_original_slice() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "earth", 0.0, 10.0);
        let hit = fetch(&mut cache, &calls, "earth", 5.0, 3.0);

        assert_eq!(times(&hit), vec![5.0, 6.0, 7.0]);
        assert_eq!(calls.get(), 1, "sub-range must not recompute");
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_frequency_partitions_keys() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "earth", 0.0, 10.0);
        cache
            .get_transforms(&WindowQuery::new("earth", 0.0, 10.0, 2.0), counting_compute(&calls))
            .unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_request_outside_window_recomputes() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "mars", 0.0, 10.0);
        let far = fetch(&mut cache, &calls, "mars", 500.0, 10.0);

        assert_eq!(far[0].time_s, 500.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 1, "replacement keeps one active entry per key");
    }

    #[test]
    fn test_prefetch_runs_once_and_promotes() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);
        let key = CacheKey::new("moon", 1.0);

        fetch(&mut cache, &calls, "moon", 0.0, 10.0); // window [0, 20)
        for _ in 0..4 {
            fetch(&mut cache, &calls, "moon", 6.0, 4.0); // consumes 50%
        }
        assert_eq!(calls.get(), 2, "exactly one speculative computation");
        assert_eq!(cache.pending_window(&key), Some(SampleWindow::new(20.0, 8.0, 1.0)));

        let promoted = fetch(&mut cache, &calls, "moon", 20.0, 4.0);
        assert_eq!(times(&promoted), vec![20.0, 21.0, 22.0, 23.0]);
        assert_eq!(cache.active_window(&key), Some(SampleWindow::new(20.0, 8.0, 1.0)));

        let stats = cache.stats();
        assert_eq!(stats.promotions, 1);
        assert_eq!(stats.prefetches, 2, "promoted window crossed the threshold again");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_below_threshold_does_not_prefetch() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "moon", 0.0, 10.0);
        fetch(&mut cache, &calls, "moon", 2.0, 4.0); // 30%
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.pending_len(), 0);
    }

    #[test]
    fn test_prefetch_failure_is_swallowed_and_retried() {
        let mut cache = TransformCache::new(config(10));
        let ok_calls = Cell::new(0);
        let failed = Cell::new(0);
        let query = WindowQuery::new("io", 6.0, 4.0, 1.0);

        fetch(&mut cache, &ok_calls, "io", 0.0, 10.0);

        let served = cache.get_transforms(&query, failing_compute(&failed)).unwrap();
        assert_eq!(served.len(), 4, "foreground request still served");
        assert_eq!(failed.get(), 1);
        assert_eq!(cache.pending_len(), 0);

        cache.get_transforms(&query, counting_compute(&ok_calls)).unwrap();
        assert_eq!(ok_calls.get(), 2, "marker cleared, retry allowed");
        assert_eq!(cache.pending_len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.prefetch_failures, 1);
        assert_eq!(stats.prefetches, 1);
    }

    #[test]
    fn test_empty_computation_fails_without_storing() {
        let mut cache: TransformCache<Tick> = TransformCache::new(config(10));
        let result = cache.get_transforms(&WindowQuery::new("x", 0.0, 10.0, 1.0), |_| Ok(Vec::new()));

        assert!(matches!(result, Err(OrbitError::ComputationFailure(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_compute_error_propagates() {
        let mut cache: TransformCache<Tick> = TransformCache::new(config(10));
        let calls = Cell::new(0);
        let result = cache.get_transforms(&WindowQuery::new("x", 0.0, 10.0, 1.0), failing_compute(&calls));

        assert!(matches!(result, Err(OrbitError::Internal(_))));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalid_queries() {
        let mut cache: TransformCache<Tick> = TransformCache::new(config(10));
        let calls = Cell::new(0);

        let zero_duration = cache.get_transforms(&WindowQuery::new("x", 0.0, 0.0, 1.0), counting_compute(&calls));
        assert!(matches!(zero_duration, Err(OrbitError::ComputationFailure(_))));

        let bad_frequency = cache.get_transforms(&WindowQuery::new("x", 0.0, 5.0, 0.0), counting_compute(&calls));
        assert!(matches!(bad_frequency, Err(OrbitError::InvalidRequest(_))));

        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_oversized_queries_rejected_before_compute() {
        let mut cache: TransformCache<Tick> = TransformCache::new(config(10));
        let calls = Cell::new(0);

        // Longer than the window limit
        let long = cache.get_transforms(&WindowQuery::new("x", 0.0, 1.0e12, 1.0), counting_compute(&calls));
        assert!(matches!(long, Err(OrbitError::InvalidRequest(_))));

        // Short enough, but far too many samples
        let dense = cache.get_transforms(&WindowQuery::new("x", 0.0, 500.0, 1.0e6), counting_compute(&calls));
        assert!(matches!(dense, Err(OrbitError::InvalidRequest(_))));

        assert_eq!(calls.get(), 0);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn test_query_at_limits_is_served() {
        let mut cache: TransformCache<Tick> = TransformCache::new(config(10));
        let calls = Cell::new(0);

        // 1000s at 10 Hz is exactly the sample limit
        let samples = cache
            .get_transforms(&WindowQuery::new("x", 0.0, 1_000.0, 10.0), counting_compute(&calls))
            .unwrap();
        assert_eq!(samples.len(), 10_000);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_fingerprint_change_recomputes() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);
        let query = WindowQuery::new("comet", 0.0, 10.0, 1.0).with_fingerprint(1);

        cache.get_transforms(&query, counting_compute(&calls)).unwrap();
        cache.get_transforms(&query, counting_compute(&calls)).unwrap();
        assert_eq!(calls.get(), 1);

        let changed = query.clone().with_fingerprint(2);
        cache.get_transforms(&changed, counting_compute(&calls)).unwrap();
        assert_eq!(calls.get(), 2, "other inputs must not be served from cache");
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_fingerprint_change_discards_pending() {
        let mut cache = TransformCache::new(config(10));
        let calls = Cell::new(0);
        let key = CacheKey::new("comet", 1.0);
        let query = |start, duration, fp| WindowQuery::new("comet", start, duration, 1.0).with_fingerprint(fp);

        cache.get_transforms(&query(0.0, 10.0, 1), counting_compute(&calls)).unwrap();
        cache.get_transforms(&query(6.0, 4.0, 1), counting_compute(&calls)).unwrap();
        assert_eq!(cache.pending_window(&key), Some(SampleWindow::new(20.0, 8.0, 1.0)));

        // Reaching the pending window under new inputs must not promote it
        cache.get_transforms(&query(20.0, 4.0, 2), counting_compute(&calls)).unwrap();
        assert_eq!(cache.stats().promotions, 0);
        assert_eq!(cache.pending_len(), 0);
        assert_eq!(calls.get(), 3);
        assert_eq!(cache.active_window(&key), Some(SampleWindow::new(20.0, 8.0, 1.0)));
    }

    #[test]
    fn test_short_request_skips_inflation() {
        let cache: TransformCache<Tick> = TransformCache::new(config(10));
        let window = cache.inflated_window(3.0, 0.5, 0.1);
        assert_eq!(window.duration_s, 0.5);
    }

    #[test]
    fn test_inflation_caps() {
        let mut cfg = config(10);
        cfg.max_window_duration_s = 15.0;
        let cache: TransformCache<Tick> = TransformCache::new(cfg.clone());
        assert_eq!(cache.inflated_window(0.0, 10.0, 1.0).duration_s, 15.0);
        assert_eq!(cache.inflated_window(0.0, 40.0, 1.0).duration_s, 40.0, "never below request");

        cfg.max_window_duration_s = 1_000.0;
        cfg.max_window_samples = 12;
        let cache: TransformCache<Tick> = TransformCache::new(cfg);
        assert_eq!(cache.inflated_window(0.0, 10.0, 1.0).duration_s, 12.0);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut cfg = config(2);
        cfg.eviction_policy = EvictionPolicy::Fifo;
        let mut cache = TransformCache::new(cfg);
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        fetch(&mut cache, &calls, "a", 0.0, 2.0); // access does not matter for FIFO
        fetch(&mut cache, &calls, "c", 0.0, 2.0);

        assert!(!cache.contains(&CacheKey::new("a", 1.0)));
        assert!(cache.contains(&CacheKey::new("b", 1.0)));
        assert!(cache.contains(&CacheKey::new("c", 1.0)));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_lru_eviction_follows_access() {
        let mut cache = TransformCache::new(config(2));
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "c", 0.0, 2.0);

        assert!(cache.contains(&CacheKey::new("a", 1.0)));
        assert!(!cache.contains(&CacheKey::new("b", 1.0)));
    }

    #[test]
    fn test_lfu_eviction_follows_counts() {
        let mut cfg = config(2);
        cfg.eviction_policy = EvictionPolicy::Lfu;
        let mut cache = TransformCache::new(cfg);
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "c", 0.0, 2.0);

        assert!(!cache.contains(&CacheKey::new("a", 1.0)));
        assert!(cache.contains(&CacheKey::new("b", 1.0)));
    }

    #[test]
    fn test_ttl_expiration_recomputes() {
        let mut cfg = config(10);
        cfg.ttl = Duration::from_millis(50);
        cfg.auto_prefetch_threshold = 1.1;
        let mut cache = TransformCache::new(cfg);
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        assert_eq!(calls.get(), 1);

        sleep(Duration::from_millis(80));
        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_cleanup_expired() {
        let mut cfg = config(10);
        cfg.ttl = Duration::ZERO;
        let mut cache = TransformCache::new(cfg);
        let calls = Cell::new(0);

        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.cleanup_expired(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.cleanup_expired(), 0);
    }

    #[test]
    fn test_zero_capacity_raised_to_one() {
        let mut cache = TransformCache::new(config(0));
        let calls = Cell::new(0);
        fetch(&mut cache, &calls, "a", 0.0, 2.0);
        fetch(&mut cache, &calls, "b", 0.0, 2.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::new("earth", 2.5).to_string(), "earth@2.5Hz");
        assert_eq!(CacheKey::new("x", 0.0), CacheKey::new("x", -0.0));
    }
}
