//! Cache Entry Module
//!
//! Defines sample windows and the cache entries that hold them, including the
//! index arithmetic used to extract a requested sub-range.

use std::time::{Duration, Instant};

// == Index Rounding ==
/// Slack subtracted before `ceil` so that a ratio landing a hair above an
/// integer (floating noise on exact multiples) does not skip a sample.
const INDEX_SNAP: f64 = 1e-9;

/// `ceil` with floating-noise snapping, clamped at zero.
pub fn ceil_index(ratio: f64) -> usize {
    let idx = (ratio - INDEX_SNAP).ceil();
    if idx.is_finite() && idx > 0.0 {
        idx as usize
    } else {
        0
    }
}

// == Timed Sample ==
/// A value stamped with the time (seconds) it was sampled at.
pub trait TimedSample: Clone {
    fn time_s(&self) -> f64;
}

// == Sample Window ==
/// A contiguous time interval sampled at a constant stride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    pub start_s: f64,
    pub duration_s: f64,
    pub sampling_interval_s: f64,
}

impl SampleWindow {
    pub fn new(start_s: f64, duration_s: f64, sampling_interval_s: f64) -> Self {
        Self {
            start_s,
            duration_s,
            sampling_interval_s,
        }
    }

    pub fn end_s(&self) -> f64 {
        self.start_s + self.duration_s
    }

    /// Number of samples: `ceil(duration / interval)`.
    pub fn sample_count(&self) -> usize {
        if self.duration_s <= 0.0 || self.sampling_interval_s <= 0.0 {
            return 0;
        }
        ceil_index(self.duration_s / self.sampling_interval_s)
    }

    /// Sample times, starting at `start_s` with constant stride.
    pub fn sample_times(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.sample_count()).map(move |i| self.start_s + i as f64 * self.sampling_interval_s)
    }
}

// == Cache Entry ==
/// A computed window of samples with access metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The window the samples cover
    pub window: SampleWindow,
    /// Time-ordered samples, first at `window.start_s`
    pub samples: Vec<T>,
    /// When the window was computed
    pub created_at: Instant,
    /// Last cache hit (or creation)
    pub last_accessed_at: Instant,
    /// Number of cache hits served
    pub access_count: u64,
    /// Digest of the inputs the samples were computed from
    pub fingerprint: u64,
}

impl<T: TimedSample> CacheEntry<T> {
    // == Constructor ==
    pub fn new(window: SampleWindow, samples: Vec<T>) -> Self {
        let now = Instant::now();
        Self {
            window,
            samples,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            fingerprint: 0,
        }
    }

    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    // == Is Expired ==
    /// An entry is expired once its age reaches `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }

    // == Covers ==
    /// Whether `[start, start + duration)` lies within the window, widened by
    /// one sampling interval on both sides.
    pub fn covers(&self, start_s: f64, duration_s: f64) -> bool {
        let tolerance = self.window.sampling_interval_s;
        start_s >= self.window.start_s - tolerance
            && start_s + duration_s <= self.window.end_s() + tolerance
    }

    /// Fraction of the window consumed by a request ending at `start + duration`.
    pub fn consumption(&self, start_s: f64, duration_s: f64) -> f64 {
        if self.window.duration_s <= 0.0 {
            return 1.0;
        }
        (start_s + duration_s - self.window.start_s) / self.window.duration_s
    }

    // == Touch ==
    /// Records a cache hit.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = Instant::now();
    }

    // == Extract ==
    /// Returns the samples overlapping `[start, start + duration)`.
    ///
    /// Both bounds use `ceil` relative to the window start, so a request
    /// starting between two samples begins at the later one.
    pub fn extract(&self, start_s: f64, duration_s: f64) -> Vec<T> {
        let interval = self.window.sampling_interval_s;
        let len = self.samples.len();
        let from = ceil_index((start_s - self.window.start_s) / interval).min(len);
        let to = ceil_index((start_s + duration_s - self.window.start_s) / interval).clamp(from, len);
        self.samples[from..to].to_vec()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_support::Tick;
    use std::thread::sleep;

    fn entry(start: f64, duration: f64, interval: f64) -> CacheEntry<Tick> {
        let window = SampleWindow::new(start, duration, interval);
        let samples = window.sample_times().map(Tick::at).collect();
        CacheEntry::new(window, samples)
    }

    fn times(samples: &[Tick]) -> Vec<f64> {
        samples.iter().map(|t| t.time_s).collect()
    }

    #[test]
    fn test_sample_count_is_ceil() {
        assert_eq!(SampleWindow::new(0.0, 10.0, 1.0).sample_count(), 10);
        assert_eq!(SampleWindow::new(0.0, 10.5, 1.0).sample_count(), 11);
        assert_eq!(SampleWindow::new(0.0, 0.3, 0.1).sample_count(), 3);
        assert_eq!(SampleWindow::new(0.0, 0.0, 1.0).sample_count(), 0);
        assert_eq!(SampleWindow::new(0.0, 5.0, 0.0).sample_count(), 0);
    }

    #[test]
    fn test_sample_times_stride() {
        let window = SampleWindow::new(2.0, 2.0, 0.5);
        let t: Vec<f64> = window.sample_times().collect();
        assert_eq!(t, vec![2.0, 2.5, 3.0, 3.5]);
    }

    #[test]
    fn test_entry_creation() {
        let e = entry(0.0, 10.0, 1.0);
        assert_eq!(e.samples.len(), 10);
        assert_eq!(e.access_count, 0);
        assert_eq!(e.samples.first().map(TimedSample::time_s), Some(0.0));
        assert_eq!(e.fingerprint, 0);
        assert_eq!(e.clone().with_fingerprint(7).fingerprint, 7);
        assert!(!e.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_expiration() {
        let e = entry(0.0, 10.0, 1.0);
        assert!(e.is_expired(Duration::ZERO), "age >= ttl must expire");

        sleep(Duration::from_millis(30));
        assert!(e.is_expired(Duration::from_millis(20)));
        assert!(!e.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_covers_with_tolerance() {
        let e = entry(10.0, 20.0, 1.0);
        assert!(e.covers(10.0, 20.0));
        assert!(e.covers(9.0, 5.0), "one interval of slack before start");
        assert!(e.covers(25.0, 6.0), "one interval of slack after end");
        assert!(!e.covers(8.5, 2.0));
        assert!(!e.covers(25.0, 6.5));
    }

    #[test]
    fn test_extract_subset() {
        let e = entry(0.0, 20.0, 1.0);
        assert_eq!(times(&e.extract(5.0, 3.0)), vec![5.0, 6.0, 7.0]);
        assert_eq!(times(&e.extract(4.2, 2.0)), vec![5.0, 6.0]);
        assert_eq!(e.extract(0.0, 20.0).len(), 20);
    }

    #[test]
    fn test_extract_clamps_to_window() {
        let e = entry(10.0, 5.0, 1.0);
        assert_eq!(times(&e.extract(9.0, 3.0)), vec![10.0, 11.0]);
        assert_eq!(times(&e.extract(13.0, 3.0)), vec![13.0, 14.0]);
        assert!(e.extract(15.5, 0.2).is_empty());
    }

    #[test]
    fn test_extract_fractional_interval() {
        let e = entry(0.0, 1.0, 0.1);
        let got = e.extract(0.3, 0.3);
        assert_eq!(got.len(), 3);
        assert!((got[0].time_s - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_consumption() {
        let e = entry(0.0, 40.0, 1.0);
        assert_eq!(e.consumption(0.0, 10.0), 0.25);
        assert_eq!(e.consumption(20.0, 10.0), 0.75);
    }

    #[test]
    fn test_touch() {
        let mut e = entry(0.0, 1.0, 1.0);
        let before = e.last_accessed_at;
        e.touch();
        e.touch();
        assert_eq!(e.access_count, 2);
        assert!(e.last_accessed_at >= before);
    }
}
