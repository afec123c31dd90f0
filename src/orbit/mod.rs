//! Orbit Module
//!
//! Math primitives plus the Kepler and orientation propagators.

pub mod kepler;
pub mod math;
pub mod orientation;
mod transform;


// Re-export public types
pub use kepler::{normalize_angle, solve_kepler, wrap_time, KeplerPropagator, OrbitalElements};
pub use math::{look_rotation, Quaternion, Vector3, AU_METERS, GRAVITATIONAL_CONSTANT};
pub use orientation::{OrientationPropagator, RotationParameters};
pub use transform::{round_to_millis, Transform};
