//! Parametric surfaces and their sampling
//!
//! Each shape yields a lazy, restartable sequence of [`SurfacePoint`]s and
//! decides how its points are shaded. The shading fidelity differs per shape
//! and is kept that way on purpose:
//!
//! - sphere: true normals through the [`LightingModel`]
//! - torus: closed-form luminance with a fixed light, or true normals when `lit`
//! - cube: a constant glyph per face, the position as a proxy normal, or true face normals

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::animation::RotationState;
use crate::lighting::{torus_luminance, Light, LightingModel};
use crate::transform::{Rotation, WorldPoint};
use crate::vector::{normalize, spherical, steps, Vec3, EPSILON};

/// One sample of a surface in shape-local coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    /// Outward unit normal
    pub normal: Vec3,
    /// The two sampling parameters that produced this point
    pub param: [f64; 2],
    pub face: Option<CubeFace>,
}

impl SurfacePoint {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            param: [0.0, 0.0],
            face: None,
        }
    }
}

/// Shading result before glyph mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shade {
    /// Normalized intensity in `[0, 1]`
    Intensity(f64),
    /// A fixed character that bypasses the ramp
    Glyph(char),
}

/// Per-frame inputs to shading
#[derive(Debug, Clone, Copy)]
pub struct ShadeContext<'a> {
    pub lighting: &'a LightingModel,
    pub lights: &'a [Light],
    pub rotation: &'a RotationState,
}

/// Capability shared by every shape variant
pub trait Surface {
    fn name(&self) -> &'static str;

    /// Fresh iterator over the surface samples, in a fixed order
    fn samples(&self) -> Box<dyn Iterator<Item = SurfacePoint> + Send + '_>;

    /// The rotation convention of this shape for the given angles
    fn rotation(&self, state: &RotationState) -> Rotation;

    /// Shade a rotated point, or `None` when it must not be drawn
    fn shade(
        &self,
        point: &SurfacePoint,
        world: &WorldPoint,
        ctx: &ShadeContext<'_>,
    ) -> Option<Shade>;

    /// Whether the generic viewer-facing test applies before shading
    fn culls_backfaces(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Sphere {
    pub radius: f64,
    /// Polar step, kept coarser than the azimuth step against pole crowding
    pub phi_step: f64,
    pub theta_step: f64,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            radius: 10.0,
            phi_step: 0.07,
            theta_step: 0.02,
        }
    }
}

impl Surface for Sphere {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn samples(&self) -> Box<dyn Iterator<Item = SurfacePoint> + Send + '_> {
        if !self.radius.is_finite() || self.radius.abs() <= EPSILON {
            return Box::new(std::iter::empty());
        }
        let radius = self.radius;
        let theta_step = self.theta_step;
        Box::new(steps(0.0, TAU, self.phi_step).flat_map(move |phi| {
            steps(0.0, TAU, theta_step).map(move |theta| {
                let unit = spherical(1.0, theta, phi);
                SurfacePoint {
                    position: unit * radius,
                    normal: unit,
                    param: [phi, theta],
                    face: None,
                }
            })
        }))
    }

    fn rotation(&self, state: &RotationState) -> Rotation {
        Rotation::y_then_x(state.a, state.b)
    }

    fn shade(
        &self,
        _point: &SurfacePoint,
        world: &WorldPoint,
        ctx: &ShadeContext<'_>,
    ) -> Option<Shade> {
        Some(Shade::Intensity(ctx.lighting.intensity(
            &world.normal,
            &world.position,
            ctx.lights,
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TorusShading {
    /// Luminance from the closed-form trig expression with its baked-in light.
    /// Intensity is `gain * L`; the default maps `L` onto a 12-glyph ramp as `L * 8`.
    ClosedForm { gain: f64 },
    /// Explicit tube normals through the lighting model and the frame's lights
    Lit,
}

impl Default for TorusShading {
    fn default() -> Self {
        TorusShading::ClosedForm {
            gain: DEFAULT_TORUS_GAIN,
        }
    }
}

/// `L * 8` expressed as a fraction of the last index of a 12-glyph ramp
pub const DEFAULT_TORUS_GAIN: f64 = 8.0 / 11.0;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Torus {
    /// Tube radius
    pub r1: f64,
    /// Distance from the torus center to the tube center
    pub r2: f64,
    pub theta_step: f64,
    pub phi_step: f64,
    pub shading: TorusShading,
}

impl Default for Torus {
    fn default() -> Self {
        Self {
            r1: 1.0,
            r2: 2.0,
            theta_step: 0.02,
            phi_step: 0.07,
            shading: TorusShading::default(),
        }
    }
}

impl Surface for Torus {
    fn name(&self) -> &'static str {
        "torus"
    }

    fn samples(&self) -> Box<dyn Iterator<Item = SurfacePoint> + Send + '_> {
        let (r1, r2) = (self.r1, self.r2);
        let theta_step = self.theta_step;
        Box::new(steps(0.0, TAU, self.phi_step).flat_map(move |phi| {
            let (sin_phi, cos_phi) = phi.sin_cos();
            steps(0.0, TAU, theta_step).map(move |theta| {
                let (sin_theta, cos_theta) = theta.sin_cos();
                let circle_x = r2 + r1 * cos_theta;
                let circle_y = r1 * sin_theta;
                SurfacePoint {
                    position: Vec3::new(circle_x * cos_phi, circle_y, circle_x * sin_phi),
                    normal: Vec3::new(cos_theta * cos_phi, sin_theta, cos_theta * sin_phi),
                    param: [theta, phi],
                    face: None,
                }
            })
        }))
    }

    fn rotation(&self, state: &RotationState) -> Rotation {
        Rotation::x_then_z(state.a, state.b)
    }

    fn shade(
        &self,
        point: &SurfacePoint,
        world: &WorldPoint,
        ctx: &ShadeContext<'_>,
    ) -> Option<Shade> {
        match self.shading {
            TorusShading::ClosedForm { gain } => {
                let [theta, phi] = point.param;
                let luminance = torus_luminance(theta, phi, ctx.rotation.a, ctx.rotation.b);
                // on the default ramp the glyph index is floor(8 L)
                if luminance > 0.0 {
                    Some(Shade::Intensity((luminance * gain).min(1.0)))
                } else {
                    None
                }
            }
            TorusShading::Lit => Some(Shade::Intensity(ctx.lighting.intensity(
                &world.normal,
                &world.position,
                ctx.lights,
            ))),
        }
    }

    fn culls_backfaces(&self) -> bool {
        // the closed form filters on its own luminance sign instead
        matches!(self.shading, TorusShading::Lit)
    }
}

/// The six cube faces in sweep order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    NegZ,
    PosX,
    NegX,
    PosZ,
    NegY,
    PosY,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::NegZ,
        CubeFace::PosX,
        CubeFace::NegX,
        CubeFace::PosZ,
        CubeFace::NegY,
        CubeFace::PosY,
    ];

    /// Glyph used when the cube is drawn with flat face characters
    pub fn glyph(self) -> char {
        match self {
            CubeFace::NegZ => '@',
            CubeFace::PosX => '$',
            CubeFace::NegX => '#',
            CubeFace::PosZ => '~',
            CubeFace::NegY => ';',
            CubeFace::PosY => '+',
        }
    }

    pub fn normal(self) -> Vec3 {
        match self {
            CubeFace::NegZ => Vec3::new(0.0, 0.0, -1.0),
            CubeFace::PosX => Vec3::new(1.0, 0.0, 0.0),
            CubeFace::NegX => Vec3::new(-1.0, 0.0, 0.0),
            CubeFace::PosZ => Vec3::new(0.0, 0.0, 1.0),
            CubeFace::NegY => Vec3::new(0.0, -1.0, 0.0),
            CubeFace::PosY => Vec3::new(0.0, 1.0, 0.0),
        }
    }

    /// Point on this face for sweep coordinates `(u, v)`
    pub fn point(self, u: f64, v: f64, size: f64) -> Vec3 {
        match self {
            CubeFace::NegZ => Vec3::new(u, v, -size),
            CubeFace::PosX => Vec3::new(size, v, u),
            CubeFace::NegX => Vec3::new(-size, v, -u),
            CubeFace::PosZ => Vec3::new(-u, v, size),
            CubeFace::NegY => Vec3::new(u, -size, -v),
            CubeFace::PosY => Vec3::new(u, size, v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeShading {
    /// Constant character per face, no lighting
    #[default]
    Faces,
    /// Lighting with the normalized un-rotated position standing in for the normal
    Proxy,
    /// Lighting with the rotated face normal
    Normals,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Cube {
    /// Half the edge length
    pub size: f64,
    pub step: f64,
    pub shading: CubeShading,
}

impl Default for Cube {
    fn default() -> Self {
        Self {
            size: 10.0,
            step: 0.6,
            shading: CubeShading::Faces,
        }
    }
}

impl Surface for Cube {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn samples(&self) -> Box<dyn Iterator<Item = SurfacePoint> + Send + '_> {
        if !self.size.is_finite() || self.size <= EPSILON {
            return Box::new(std::iter::empty());
        }
        let (size, step) = (self.size, self.step);
        Box::new(steps(-size, size, step).flat_map(move |u| {
            steps(-size, size, step).flat_map(move |v| {
                CubeFace::ALL.into_iter().map(move |face| SurfacePoint {
                    position: face.point(u, v, size),
                    normal: face.normal(),
                    param: [u, v],
                    face: Some(face),
                })
            })
        }))
    }

    fn rotation(&self, state: &RotationState) -> Rotation {
        Rotation::fused(state.a, state.b, state.c)
    }

    fn shade(
        &self,
        point: &SurfacePoint,
        world: &WorldPoint,
        ctx: &ShadeContext<'_>,
    ) -> Option<Shade> {
        match self.shading {
            CubeShading::Faces => point.face.map(|face| Shade::Glyph(face.glyph())),
            CubeShading::Proxy => {
                let proxy = normalize(&point.position)?;
                Some(Shade::Intensity(ctx.lighting.intensity(
                    &proxy,
                    &point.position,
                    ctx.lights,
                )))
            }
            CubeShading::Normals => Some(Shade::Intensity(ctx.lighting.intensity(
                &world.normal,
                &world.position,
                ctx.lights,
            ))),
        }
    }
}

/// The configured shape of a scene
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Sphere(Sphere),
    Torus(Torus),
    Cube(Cube),
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Sphere(Sphere::default())
    }
}

impl Shape {
    pub fn surface(&self) -> &(dyn Surface + Sync) {
        match self {
            Shape::Sphere(sphere) => sphere,
            Shape::Torus(torus) => torus,
            Shape::Cube(cube) => cube,
        }
    }

    /// Whether the frame's lights influence this shape at all
    pub fn uses_lights(&self) -> bool {
        match self {
            Shape::Sphere(_) => true,
            Shape::Torus(torus) => matches!(torus.shading, TorusShading::Lit),
            Shape::Cube(cube) => cube.shading != CubeShading::Faces,
        }
    }
}
