//! Lighting model: ambient floor, diffuse, specular and multi-light combination

use serde::{Deserialize, Serialize};

use crate::vector::{normalize, Vec3};

/// How a light's vector is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    /// The vector points from the scene toward the light
    #[default]
    Directional,
    /// The vector is a position; direction is taken from the surface point
    Positional,
}

/// Distance falloff applied to a light's contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attenuation {
    #[default]
    None,
    /// `1 / (1 + d^2)` with `d` the length of the light vector, measured from the origin
    InverseSquare,
}

/// A single light for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub vector: Vec3,
    pub intensity: f64,
    pub attenuation: Attenuation,
}

impl Light {
    pub fn directional(direction: Vec3, intensity: f64) -> Self {
        Self {
            kind: LightKind::Directional,
            vector: direction,
            intensity,
            attenuation: Attenuation::None,
        }
    }

    pub fn positional(position: Vec3, intensity: f64) -> Self {
        Self {
            kind: LightKind::Positional,
            vector: position,
            intensity,
            attenuation: Attenuation::None,
        }
    }

    pub fn with_attenuation(mut self, attenuation: Attenuation) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Unit vector from `point` toward the light, `None` when degenerate
    pub fn direction_from(&self, point: &Vec3) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional => normalize(&self.vector),
            LightKind::Positional => normalize(&(self.vector - point)),
        }
    }

    pub fn attenuation_factor(&self) -> f64 {
        match self.attenuation {
            Attenuation::None => 1.0,
            Attenuation::InverseSquare => 1.0 / (1.0 + self.vector.norm_squared()),
        }
    }

    /// Effective strength after clamping negative intensities and attenuation
    pub fn strength(&self) -> f64 {
        self.intensity.max(0.0) * self.attenuation_factor()
    }
}

/// How per-light diffuse terms are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Combine {
    #[default]
    Sum,
    Average,
}

/// Material constants shared by every point of a frame
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LightingModel {
    /// Added unconditionally so unlit surfaces stay faintly visible
    pub ambient: f64,
    /// Sharpness of the specular highlight; `None` disables it
    pub specular_exponent: Option<i32>,
    pub combine: Combine,
    /// Lower bound applied before clamping, keeps glyphs from going fully dark
    pub min_intensity: Option<f64>,
}

impl Default for LightingModel {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            specular_exponent: None,
            combine: Combine::Sum,
            min_intensity: None,
        }
    }
}

impl LightingModel {
    /// Diffuse only, no ambient floor
    pub fn diffuse() -> Self {
        Self {
            ambient: 0.0,
            ..Self::default()
        }
    }

    /// Intensity in `[0, 1]` for a unit `normal` at `point`.
    ///
    /// The specular lobe uses the view-axis reflection approximation
    /// `max(0, 2 (n.l) n.z - l.z)` and only lights surfaces the diffuse term reaches.
    pub fn intensity(&self, normal: &Vec3, point: &Vec3, lights: &[Light]) -> f64 {
        let mut diffuse = 0.0;
        let mut specular = 0.0;

        for light in lights {
            let Some(direction) = light.direction_from(point) else {
                continue;
            };
            let strength = light.strength();
            let facing = normal.dot(&direction).max(0.0);
            diffuse += facing * strength;

            if let Some(exponent) = self.specular_exponent {
                if facing > 0.0 {
                    let reflection = (2.0 * facing * normal.z - direction.z).max(0.0);
                    specular += reflection.powi(exponent) * strength;
                }
            }
        }

        if self.combine == Combine::Average && !lights.is_empty() {
            diffuse /= lights.len() as f64;
        }

        let mut total = self.ambient + diffuse + specular;
        if let Some(floor) = self.min_intensity {
            total = total.max(floor);
        }
        clamp_unit(total)
    }
}

/// Clamp into `[0, 1]`, mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Light direction baked into the torus luminance formula (not normalized)
pub fn torus_light() -> Vec3 {
    Vec3::new(0.0, 1.0, -1.0)
}

/// Closed-form torus luminance for tube angle `theta`, revolution angle `phi`
/// and rotation angles `a` (about X) and `b` (about Z).
///
/// Equal to the rotated tube normal dotted with [`torus_light`], so it ranges
/// over `[-sqrt 2, sqrt 2]`; non-positive values face away from the light.
pub fn torus_luminance(theta: f64, phi: f64, a: f64, b: f64) -> f64 {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_a, cos_a) = a.sin_cos();
    let (sin_b, cos_b) = b.sin_cos();
    cos_phi * cos_theta * sin_b - cos_a * cos_theta * sin_phi - sin_a * sin_theta
        + cos_b * (cos_a * sin_theta - cos_theta * sin_a * sin_phi)
}
