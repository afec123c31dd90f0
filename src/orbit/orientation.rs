//! Orientation Propagator Module
//!
//! Produces the instantaneous orientation of a body, either spinning freely
//! about its polar axis or tidally locked to its primary.
//!
//! Local axes: +Z faces forward (toward the primary when tidally locked),
//! +Y is the polar axis.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, Result};
use crate::orbit::math::{look_rotation, Quaternion, Vector3, SECONDS_PER_HOUR};

// == Rotation Parameters ==
/// Spin state of a body. Angles in radians, period in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationParameters {
    pub tidal_locked: bool,
    #[serde(default)]
    pub rotation_period_hours: f64,
    #[serde(default)]
    pub tilt_rad: f64,
    #[serde(default)]
    pub spin_longitude_rad: f64,
}

impl RotationParameters {
    /// Parameters for a body locked to its primary.
    pub fn tidally_locked(tilt_rad: f64, spin_longitude_rad: f64) -> Self {
        Self {
            tidal_locked: true,
            rotation_period_hours: 0.0,
            tilt_rad,
            spin_longitude_rad,
        }
    }

    /// Parameters for a freely spinning body.
    pub fn free(rotation_period_hours: f64, tilt_rad: f64, spin_longitude_rad: f64) -> Self {
        Self {
            tidal_locked: false,
            rotation_period_hours,
            tilt_rad,
            spin_longitude_rad,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tilt_rad.is_finite() || !self.spin_longitude_rad.is_finite() {
            return Err(OrbitError::Validation(
                "tilt and spin longitude must be finite".to_string(),
            ));
        }
        if !self.tidal_locked
            && !(self.rotation_period_hours > 0.0 && self.rotation_period_hours.is_finite())
        {
            return Err(OrbitError::Validation(format!(
                "rotation period must be positive when not tidally locked, got {}",
                self.rotation_period_hours
            )));
        }
        Ok(())
    }
}

// == Orientation Propagator ==
/// Validated orientation model for one body.
#[derive(Debug, Clone)]
pub struct OrientationPropagator {
    params: RotationParameters,
    epoch_s: f64,
    /// Fixed tilt and spin-longitude offsets, applied in local space
    offset: Quaternion,
    /// Spin rate in radians per second (zero when tidally locked)
    angular_velocity: f64,
}

impl OrientationPropagator {
    // == Constructor ==
    pub fn new(params: &RotationParameters, epoch_s: f64) -> Result<Self> {
        params.validate()?;

        let tilt = Quaternion::from_axis_angle(Vector3::Z, params.tilt_rad);
        let spin_longitude = Quaternion::from_axis_angle(Vector3::Y, params.spin_longitude_rad);
        let angular_velocity = if params.tidal_locked {
            0.0
        } else {
            TAU / (params.rotation_period_hours * SECONDS_PER_HOUR)
        };

        Ok(Self {
            params: *params,
            epoch_s,
            offset: tilt * spin_longitude,
            angular_velocity,
        })
    }

    pub fn is_tidally_locked(&self) -> bool {
        self.params.tidal_locked
    }

    /// Local axis that points at the primary while tidally locked.
    ///
    /// This is +Z carried back through the tilt and spin-longitude offsets,
    /// so it is +Z itself only when both are zero. Tilt turns about +Z and
    /// never moves it; spin longitude does.
    pub fn primary_facing_axis(&self) -> Vector3 {
        self.offset.inverse() * Vector3::Z
    }

    /// Spin angle about the polar axis at `time_s` (unwrapped).
    pub fn spin_angle_at(&self, time_s: f64) -> f64 {
        self.angular_velocity * (time_s - self.epoch_s)
    }

    // == Orientation ==
    /// Orientation at `time_s`.
    ///
    /// `position` and `previous` are the body's orbital positions relative to
    /// its primary at this and the preceding sample; they are only used when
    /// tidally locked. A missing or coincident `previous` falls back to the
    /// default up axis.
    pub fn orientation_at(
        &self,
        time_s: f64,
        position: Vector3,
        previous: Option<Vector3>,
    ) -> Quaternion {
        if self.params.tidal_locked {
            let toward_primary = -position;
            let up = previous
                .map(|prev| position.cross(prev))
                .and_then(Vector3::try_normalize)
                .unwrap_or(Vector3::Y);
            let facing = look_rotation(toward_primary, up);
            (facing * self.offset).normalize()
        } else {
            let spin = Quaternion::from_axis_angle(Vector3::Y, self.spin_angle_at(time_s));
            (self.offset * spin).normalize()
        }
    }
}
