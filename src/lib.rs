//! Orbit Cache - Kepler orbit propagation behind a time-windowed transform cache
//!
//! Computes positions and orientations of orbiting bodies over time windows
//! and serves them from a cache with TTL expiration, eviction and
//! speculative prefetch of the following window.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod orbit;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
