//! Shared fixtures for cache tests.

use std::cell::Cell;

use crate::cache::{SampleWindow, TimedSample};
use crate::error::{OrbitError, Result};

/// Minimal timed sample carrying only its time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub time_s: f64,
}

impl Tick {
    pub fn at(time_s: f64) -> Self {
        Self { time_s }
    }
}

impl TimedSample for Tick {
    fn time_s(&self) -> f64 {
        self.time_s
    }
}

/// Computes one tick per sample time and counts invocations.
pub fn counting_compute(calls: &Cell<usize>) -> impl FnMut(&SampleWindow) -> Result<Vec<Tick>> + '_ {
    move |window| {
        calls.set(calls.get() + 1);
        Ok(window.sample_times().map(Tick::at).collect())
    }
}

/// Always fails, counting invocations.
pub fn failing_compute(calls: &Cell<usize>) -> impl FnMut(&SampleWindow) -> Result<Vec<Tick>> + '_ {
    move |_| {
        calls.set(calls.get() + 1);
        Err(OrbitError::Internal("propagation failed".to_string()))
    }
}
