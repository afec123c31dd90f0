//! Cache Module
//!
//! Time-windowed sample cache with TTL expiration, configurable eviction and
//! one-shot speculative prefetch of the following window.

mod entry;
mod eviction;
mod stats;
mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export public types
pub use entry::{ceil_index, CacheEntry, SampleWindow, TimedSample};
pub use eviction::{EvictionPolicy, EvictionTracker};
pub use stats::CacheStats;
pub use store::{CacheConfig, CacheKey, PrefetchKey, TransformCache, WindowQuery};
