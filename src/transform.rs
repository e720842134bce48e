//! Rigid rotation of sampled surface points into world space

use nalgebra::Matrix3;

use crate::shape::SurfacePoint;
use crate::vector::{rotation_x, rotation_y, rotation_z, Vec3};

/// A surface point after rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// A single rotation matrix applied to both positions and normals.
///
/// Building the matrix once per frame and reusing it for every point keeps
/// position and normal in lockstep; rotating a unit normal leaves it unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    matrix: Matrix3<f64>,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    /// Sphere convention: turn by `b` about Y, then by `a` about X.
    ///
    /// The Y turn runs clockwise (`x' = x cos b - z sin b`), which is why the
    /// angle is negated against the right-handed helper.
    pub fn y_then_x(a: f64, b: f64) -> Self {
        Self::from_matrix(rotation_x(a) * rotation_y(-b))
    }

    /// Torus convention: turn by `a` about X, then by `b` about Z
    pub fn x_then_z(a: f64, b: f64) -> Self {
        Self::from_matrix(rotation_z(b) * rotation_x(a))
    }

    /// Cube convention: turn by `a` about X, then `b` about Y, then `c` about Z,
    /// each clockwise against the right-handed helpers.
    ///
    /// With `b = 0` this is the cube's folded `A`/`C` expression unchanged.
    pub fn fused(a: f64, b: f64, c: f64) -> Self {
        Self::from_matrix(rotation_z(-c) * rotation_y(-b) * rotation_x(-a))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn apply(&self, v: &Vec3) -> Vec3 {
        self.matrix * v
    }

    /// Rotate a sampled point and its normal with the same matrix
    pub fn transform(&self, point: &SurfacePoint) -> WorldPoint {
        WorldPoint {
            position: self.apply(&point.position),
            normal: self.apply(&point.normal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(rotation: &Rotation) {
        let m = rotation.matrix();
        let product = m * m.transpose();
        assert!((product - Matrix3::identity()).norm() < 1e-9);
        assert!((m.determinant() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity_leaves_point() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Rotation::identity().apply(&v), v);
    }

    #[test]
    fn test_conventions_are_rotations() {
        for &(a, b, c) in &[(0.3, 1.1, 2.0), (4.0, -0.7, 0.05), (6.2, 3.1, 1.5)] {
            assert_orthonormal(&Rotation::y_then_x(a, b));
            assert_orthonormal(&Rotation::x_then_z(a, b));
            assert_orthonormal(&Rotation::fused(a, b, c));
        }
    }

    #[test]
    fn test_y_then_x_matches_stepwise_form() {
        let (a, b) = (0.4_f64, 0.9_f64);
        let p = Vec3::new(3.0, -2.0, 5.0);
        let x_rot = p.x * b.cos() - p.z * b.sin();
        let z_mid = p.x * b.sin() + p.z * b.cos();
        let y_rot = p.y * a.cos() - z_mid * a.sin();
        let z_rot = p.y * a.sin() + z_mid * a.cos();
        let out = Rotation::y_then_x(a, b).apply(&p);
        assert!((out - Vec3::new(x_rot, y_rot, z_rot)).norm() < 1e-9);
    }

    #[test]
    fn test_fused_matches_expanded_terms() {
        let (a, b, c) = (0.7_f64, 0.2_f64, 1.3_f64);
        let (i, j, k) = (2.0, -3.0, 4.0);
        let (sa, ca, sb, cb, sc, cc) = (a.sin(), a.cos(), b.sin(), b.cos(), c.sin(), c.cos());
        let x = j * sa * sb * cc - k * ca * sb * cc + j * ca * sc + k * sa * sc + i * cb * cc;
        let y = j * ca * cc + k * sa * cc - j * sa * sb * sc + k * ca * sb * sc - i * cb * sc;
        let z = k * ca * cb - j * sa * cb + i * sb;
        let out = Rotation::fused(a, b, c).apply(&Vec3::new(i, j, k));
        assert!((out - Vec3::new(x, y, z)).norm() < 1e-9);
    }

    #[test]
    #[rustfmt::skip]
    fn test_fused_without_b_matches_folded_form() {
        let (a, c) = (0.9_f64, 2.4_f64);
        let (sa, ca, sc, cc) = (a.sin(), a.cos(), c.sin(), c.cos());
        let folded = Matrix3::new(
            cc, ca * sc, sa * sc,
            -sc, ca * cc, sa * cc,
            0.0, -sa, ca,
        );
        assert!((Rotation::fused(a, 0.0, c).matrix() - folded).norm() < 1e-12);
    }

    #[test]
    fn test_fused_keeps_faces_perpendicular() {
        // distance from the center to a face plane survives any rigid turn
        for &(a, b, c) in &[(0.3, 1.1, 2.0), (4.0, -0.7, 0.05)] {
            let rotation = Rotation::fused(a, b, c);
            for normal in [Vec3::x(), -Vec3::y(), Vec3::z()] {
                let along_face = normal.cross(&Vec3::new(1.0, 2.0, 3.0));
                let point = SurfacePoint::new(normal * 10.0 + along_face, normal);
                let world = rotation.transform(&point);
                assert!((world.position.dot(&world.normal) - 10.0).abs() < 1e-9);
                assert!((world.normal.norm() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_transform_keeps_normal_unit() {
        let point = SurfacePoint::new(Vec3::new(0.0, 0.0, 10.0), Vec3::z());
        let world = Rotation::fused(1.0, 2.0, 3.0).transform(&point);
        assert!((world.normal.norm() - 1.0).abs() < 1e-12);
        assert!((world.position.norm() - 10.0).abs() < 1e-9);
    }
}
