//! Vector and trig primitives shared by every stage of the pipeline

use nalgebra::{Matrix3, Vector3};

/// Real-valued 3D vector used for positions, normals and light vectors
pub type Vec3 = Vector3<f64>;

/// Magnitudes at or below this are treated as zero
pub const EPSILON: f64 = 1e-9;

/// Normalize a vector, or `None` when it has no usable direction
pub fn normalize(v: &Vec3) -> Option<Vec3> {
    if !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    v.try_normalize(EPSILON)
}

/// Point on a sphere of `radius`; `phi` is the polar angle from +Z, `theta` the azimuth
pub fn spherical(radius: f64, theta: f64, phi: f64) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(
        radius * sin_phi * cos_theta,
        radius * sin_phi * sin_theta,
        radius * cos_phi,
    )
}

/// Right-handed rotation about the X axis
#[rustfmt::skip]
pub fn rotation_x(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, c, -s,
        0.0, s, c,
    )
}

/// Right-handed rotation about the Y axis
#[rustfmt::skip]
pub fn rotation_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, 0.0, s,
        0.0, 1.0, 0.0,
        -s, 0.0, c,
    )
}

/// Right-handed rotation about the Z axis
#[rustfmt::skip]
pub fn rotation_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(
        c, -s, 0.0,
        s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

/// Values `start, start + step, ...` strictly below `end`.
///
/// Each value is computed from its index rather than accumulated, and an
/// unusable step (zero, negative, NaN) yields nothing instead of looping forever.
pub fn steps(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> + Clone {
    let usable = step.is_finite() && step > 0.0 && start.is_finite() && end.is_finite();
    let limit = if usable { end } else { f64::NEG_INFINITY };
    (0u64..)
        .map(move |k| start + k as f64 * step)
        .take_while(move |v| *v < limit)
}
