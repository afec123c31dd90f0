//! Math Primitives Module
//!
//! Double-precision vectors and unit quaternions from `glam`, plus the frame
//! constants and the look-at rotation used by the propagators.
//!
//! Frame convention: +Y is the polar ("up") axis. An unrotated orbit lies in
//! the XZ plane with periapsis along +X.

pub use glam::{DMat3, DQuat as Quaternion, DVec3 as Vector3};

// == Constants ==
/// Newtonian gravitational constant (m³ kg⁻¹ s⁻²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

/// Astronomical unit in meters
pub const AU_METERS: f64 = 1.495_978_707e11;

/// Seconds per hour
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Squared sine of the smallest angle at which two unit vectors still define a plane
const PARALLEL_EPSILON: f64 = 1e-18;

// == Look Rotation ==
/// Rotation taking local +Z onto `forward` and local +Y onto `up`
/// orthogonalized against it.
///
/// Falls back to +Y when `up` is zero or parallel to `forward`, and to +X
/// when `forward` itself lies on +Y. A zero `forward` yields the identity.
pub fn look_rotation(forward: Vector3, up: Vector3) -> Quaternion {
    let Some(f) = forward.try_normalize() else {
        return Quaternion::IDENTITY;
    };

    let right = [up, Vector3::Y, Vector3::X]
        .into_iter()
        .filter_map(Vector3::try_normalize)
        .map(|candidate| candidate.cross(f))
        .find(|r| r.length_squared() > PARALLEL_EPSILON)
        .map_or(Vector3::X, Vector3::normalize);
    let up = f.cross(right);

    Quaternion::from_mat3(&DMat3::from_cols(right, up, f)).normalize()
}
