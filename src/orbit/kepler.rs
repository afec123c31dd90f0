//! Kepler Propagator Module
//!
//! Closed-form two-body propagation: advances mean anomaly linearly and solves
//! Kepler's equation by Newton-Raphson to place the body on its ellipse.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, Result};
use crate::orbit::math::{Quaternion, Vector3, AU_METERS, GRAVITATIONAL_CONSTANT};

// == Solver Constants ==
/// Maximum Newton-Raphson iterations for Kepler's equation
pub const KEPLER_MAX_ITERATIONS: usize = 16;

/// Step size below which the Newton-Raphson solve is considered converged
pub const KEPLER_TOLERANCE: f64 = 1e-12;

/// Eccentricity above which the solver is seeded at π instead of M
const HIGH_ECCENTRICITY_SEED: f64 = 0.8;

// == Orbital Elements ==
/// Keplerian elements of one body relative to its primary.
///
/// Distances are in astronomical units, angles in radians, masses in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub primary_mass_kg: f64,
    pub object_mass_kg: f64,
    pub periapsis_au: f64,
    pub apoapsis_au: f64,
    pub inclination_rad: f64,
    pub node_rad: f64,
    pub arg_periapsis_rad: f64,
    pub mean_anomaly_rad: f64,
}

impl OrbitalElements {
    // == Validate ==
    /// Checks the element invariants.
    ///
    /// Rejects non-finite values, non-positive masses or distances, and a
    /// periapsis beyond the apoapsis.
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("primary_mass_kg", self.primary_mass_kg),
            ("object_mass_kg", self.object_mass_kg),
            ("periapsis_au", self.periapsis_au),
            ("apoapsis_au", self.apoapsis_au),
            ("inclination_rad", self.inclination_rad),
            ("node_rad", self.node_rad),
            ("arg_periapsis_rad", self.arg_periapsis_rad),
            ("mean_anomaly_rad", self.mean_anomaly_rad),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(OrbitError::Validation(format!("{} must be finite", name)));
        }

        if self.periapsis_au <= 0.0 || self.apoapsis_au <= 0.0 {
            return Err(OrbitError::Validation(format!(
                "periapsis ({}) and apoapsis ({}) must be positive",
                self.periapsis_au, self.apoapsis_au
            )));
        }
        if self.periapsis_au > self.apoapsis_au {
            return Err(OrbitError::Validation(format!(
                "periapsis ({}) exceeds apoapsis ({})",
                self.periapsis_au, self.apoapsis_au
            )));
        }
        if self.primary_mass_kg <= 0.0 || self.object_mass_kg <= 0.0 {
            return Err(OrbitError::Validation(
                "masses must be positive".to_string(),
            ));
        }

        let e = self.eccentricity();
        if !(0.0..1.0).contains(&e) {
            return Err(OrbitError::Validation(format!(
                "eccentricity {} outside [0, 1)",
                e
            )));
        }
        Ok(())
    }

    /// Semi-major axis in meters.
    pub fn semi_major_axis_m(&self) -> f64 {
        (self.periapsis_au + self.apoapsis_au) * 0.5 * AU_METERS
    }

    /// Eccentricity derived from periapsis and apoapsis, clamped at zero.
    pub fn eccentricity(&self) -> f64 {
        let e = (self.apoapsis_au - self.periapsis_au) / (self.apoapsis_au + self.periapsis_au);
        e.max(0.0)
    }

    /// Gravitational parameter μ = G·(M + m) in m³/s².
    pub fn gravitational_parameter(&self) -> f64 {
        GRAVITATIONAL_CONSTANT * (self.primary_mass_kg + self.object_mass_kg)
    }
}

// == Kepler Propagator ==
/// Validated, precomputed two-body propagator for one body.
#[derive(Debug, Clone)]
pub struct KeplerPropagator {
    semi_major_axis_m: f64,
    eccentricity: f64,
    mean_motion: f64,
    mean_anomaly_at_epoch: f64,
    epoch_s: f64,
    orbit_rotation: Quaternion,
}

impl KeplerPropagator {
    // == Constructor ==
    /// Validates `elements` and precomputes the orbit shape and orientation.
    ///
    /// # Arguments
    /// * `elements` - Orbital elements of the body
    /// * `epoch_s` - Reference epoch (seconds) at which `mean_anomaly_rad` holds
    pub fn new(elements: &OrbitalElements, epoch_s: f64) -> Result<Self> {
        elements.validate()?;
        if !epoch_s.is_finite() {
            return Err(OrbitError::Validation("epoch must be finite".to_string()));
        }

        let a = elements.semi_major_axis_m();
        let mu = elements.gravitational_parameter();

        Ok(Self {
            semi_major_axis_m: a,
            eccentricity: elements.eccentricity(),
            mean_motion: (mu / (a * a * a)).sqrt(),
            mean_anomaly_at_epoch: elements.mean_anomaly_rad,
            epoch_s,
            orbit_rotation: orbit_rotation(elements),
        })
    }

    pub fn semi_major_axis_m(&self) -> f64 {
        self.semi_major_axis_m
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Mean motion in radians per second.
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    /// Orbital period in seconds.
    pub fn period_s(&self) -> f64 {
        TAU / self.mean_motion
    }

    /// Mean anomaly at `time_s`, normalized to [0, 2π).
    pub fn mean_anomaly_at(&self, time_s: f64) -> f64 {
        let elapsed = time_s - self.epoch_s;
        normalize_angle(self.mean_anomaly_at_epoch + self.mean_motion * elapsed)
    }

    // == Position ==
    /// Body-centric inertial position (meters) relative to the primary at `time_s`.
    pub fn position_at(&self, time_s: f64) -> Vector3 {
        let e = self.eccentricity;
        let a = self.semi_major_axis_m;
        let ea = solve_kepler(self.mean_anomaly_at(time_s), e);
        let (sin_e, cos_e) = ea.sin_cos();

        let in_plane = Vector3::new(a * (cos_e - e), 0.0, a * (1.0 - e * e).sqrt() * sin_e);
        self.orbit_rotation * in_plane
    }

    /// Unit normal of the orbital plane in the inertial frame.
    pub fn plane_normal(&self) -> Vector3 {
        self.orbit_rotation * Vector3::Y
    }
}

// == Orbit Rotation ==
/// Rotation from the perifocal frame (periapsis on +X, normal on +Y) to the
/// inertial frame.
///
/// Rotations are intrinsic: node longitude about the polar axis, inclination
/// about the resulting line of nodes, then argument of periapsis about the
/// tilted plane normal.
fn orbit_rotation(elements: &OrbitalElements) -> Quaternion {
    let node = Quaternion::from_axis_angle(Vector3::Y, elements.node_rad);
    let inclination = Quaternion::from_axis_angle(Vector3::X, elements.inclination_rad);
    let arg_periapsis = Quaternion::from_axis_angle(Vector3::Y, elements.arg_periapsis_rad);
    (node * inclination * arg_periapsis).normalize()
}

// == Kepler Solve ==
/// Solves E − e·sin(E) = M for the eccentric anomaly E.
///
/// Newton-Raphson seeded at π for e > 0.8 and at M otherwise; stops after
/// [`KEPLER_MAX_ITERATIONS`] or once the step drops below [`KEPLER_TOLERANCE`].
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let m = normalize_angle(mean_anomaly);
    let e = eccentricity;
    let mut ea = if e > HIGH_ECCENTRICITY_SEED { PI } else { m };

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = ea - e * ea.sin() - m;
        let fp = 1.0 - e * ea.cos();
        let step = f / fp;
        ea -= step;
        if step.abs() < KEPLER_TOLERANCE {
            break;
        }
    }
    ea
}

/// Reduces an angle to [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wraps `time_s` into [0, period_s) for callers that normalize request
/// start times modulo the orbital period.
pub fn wrap_time(time_s: f64, period_s: f64) -> f64 {
    if period_s > 0.0 && period_s.is_finite() {
        time_s.rem_euclid(period_s)
    } else {
        time_s
    }
}
