//! Transform Sample Module
//!
//! The time-stamped position and orientation emitted by the propagators.

use serde::{Deserialize, Serialize};

use crate::cache::TimedSample;
use crate::orbit::math::{Quaternion, Vector3};

// == Transform ==
/// One propagated sample: position relative to the primary (meters) and
/// orientation at `time_s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub time_s: f64,
    pub position: Vector3,
    pub rotation: Quaternion,
}

impl Transform {
    pub fn new(time_s: f64, position: Vector3, rotation: Quaternion) -> Self {
        Self {
            time_s,
            position,
            rotation,
        }
    }
}

impl TimedSample for Transform {
    fn time_s(&self) -> f64 {
        self.time_s
    }
}

/// Rounds a sample time to millisecond precision.
pub fn round_to_millis(time_s: f64) -> f64 {
    (time_s * 1000.0).round() / 1000.0
}
