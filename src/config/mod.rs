mod loader;

use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::{Animator, AnimationState, LightRig, Orbit, RotationState, Spin};
use crate::glyph::{ColorMode, GlyphMapper, DEFAULT_RAMP, EMPTY_CELL};
use crate::lighting::{Attenuation, Combine, LightKind, LightingModel};
use crate::projection::Projection;
use crate::renderer::Scene;
use crate::shape::{Cube, CubeShading, Shape, Sphere, Torus, TorusShading};

pub use loader::load_config;

/// Built-in presets with a one-line description each
pub const PRESETS: &[(&str, &str)] = &[
    ("sphere", "Specular sphere under an orbiting light"),
    ("sphere-basic", "Diffuse-only sphere with a swinging light"),
    ("torus", "Classic green donut with closed-form shading"),
    ("torus-lit", "Torus shaded from explicit normals and a moving light"),
    ("cube-faces", "Cube with a fixed character per face"),
    ("cube-lit", "Cube lit by two damped orbiting lights"),
    ("cube-color", "Truecolor cube under two opposed, attenuated lights"),
];

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Label shown in the status line
    pub name: String,
    pub screen: ScreenConfig,
    pub shape: Shape,
    pub projection: Projection,
    pub lighting: LightingModel,
    pub lights: Vec<LightRig>,
    pub glyphs: GlyphConfig,
    pub animation: AnimationConfig,
    pub render: RenderConfig,
}

/// Size of the character grid
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScreenConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GlyphConfig {
    /// Characters ordered dark to bright
    pub ramp: String,
    pub empty: char,
    pub color: ColorMode,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            ramp: DEFAULT_RAMP.to_string(),
            empty: EMPTY_CELL,
            color: ColorMode::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Angle increments per frame
    pub spin: Spin,
    /// Angles of the first frame
    pub start: RotationState,
    pub frame_interval_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            spin: Spin::new(0.05, 0.03, 0.0),
            start: RotationState::default(),
            frame_interval_ms: default_frame_interval(),
        }
    }
}

fn default_frame_interval() -> u64 {
    30
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Sample points on the rayon pool
    pub parallel: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        sphere_preset()
    }
}

impl AppConfig {
    /// Load and validate configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// A built-in preset by name
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        let config = match name {
            "sphere" => sphere_preset(),
            "sphere-basic" => sphere_basic_preset(),
            "torus" => torus_preset(),
            "torus-lit" => torus_lit_preset(),
            "cube-faces" => cube_faces_preset(),
            "cube-lit" => cube_lit_preset(),
            "cube-color" => cube_color_preset(),
            other => return Err(ConfigError::UnknownPreset(other.to_string())),
        };
        Ok(config)
    }

    /// Load from `path` when given, otherwise the named preset
    pub fn load_or_preset(path: Option<&Path>, preset: &str) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::preset(preset),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(invalid("screen width and height must be positive"));
        }

        match &self.shape {
            Shape::Sphere(sphere) => {
                check_finite("shape.radius", sphere.radius)?;
                check_step("shape.phi_step", sphere.phi_step)?;
                check_step("shape.theta_step", sphere.theta_step)?;
            }
            Shape::Torus(torus) => {
                check_finite("shape.r1", torus.r1)?;
                check_finite("shape.r2", torus.r2)?;
                check_step("shape.theta_step", torus.theta_step)?;
                check_step("shape.phi_step", torus.phi_step)?;
                if let TorusShading::ClosedForm { gain } = torus.shading {
                    check_finite("shape.shading.gain", gain)?;
                }
            }
            Shape::Cube(cube) => {
                check_finite("shape.size", cube.size)?;
                check_step("shape.step", cube.step)?;
            }
        }

        match self.projection {
            Projection::Orthographic { scale_x, scale_y } => {
                check_finite("projection.scale_x", scale_x)?;
                check_finite("projection.scale_y", scale_y)?;
            }
            Projection::Perspective {
                k1,
                k2,
                aspect_x,
                aspect_y,
            } => {
                check_finite("projection.k1", k1)?;
                check_finite("projection.k2", k2)?;
                check_finite("projection.aspect_x", aspect_x)?;
                check_finite("projection.aspect_y", aspect_y)?;
            }
        }

        check_finite("lighting.ambient", self.lighting.ambient)?;
        if let Some(exponent) = self.lighting.specular_exponent {
            if exponent < 0 {
                return Err(invalid("lighting.specular_exponent must not be negative"));
            }
        }
        if let Some(floor) = self.lighting.min_intensity {
            if !(0.0..=1.0).contains(&floor) {
                return Err(invalid("lighting.min_intensity must be within [0, 1]"));
            }
        }

        for (index, rig) in self.lights.iter().enumerate() {
            if !rig.intensity.is_finite() || rig.intensity < 0.0 {
                return Err(invalid(format!(
                    "lights[{index}].intensity must be a non-negative number"
                )));
            }
            check_finite(&format!("lights[{index}].radius"), rig.radius)?;
            if let Orbit::Mirror { of } = rig.orbit {
                if of >= index {
                    return Err(invalid(format!(
                        "lights[{index}] can only mirror an earlier light"
                    )));
                }
            }
        }

        if self.glyphs.ramp.is_empty() {
            return Err(invalid("glyphs.ramp must not be empty"));
        }
        if self.animation.frame_interval_ms == 0 {
            return Err(invalid("animation.frame_interval_ms must be positive"));
        }

        Ok(())
    }

    /// Log options that have no effect on the configured shape
    pub fn warn_ignored(&self) {
        if !self.lights.is_empty() && !self.shape.uses_lights() {
            tracing::warn!(
                shape = self.shape.surface().name(),
                lights = self.lights.len(),
                "Lights are configured but this shading mode ignores them"
            );
        }
    }

    pub fn scene(&self) -> Scene {
        Scene {
            shape: self.shape,
            projection: self.projection,
            lighting: self.lighting,
            glyphs: GlyphMapper::new(&self.glyphs.ramp, self.glyphs.empty, self.glyphs.color),
            width: self.screen.width,
            height: self.screen.height,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.animation.frame_interval_ms)
    }

    pub fn animator(&self) -> Animator {
        Animator::new(
            self.animation.spin,
            self.lights.clone(),
            self.frame_interval().as_secs_f64(),
        )
    }

    /// Driver and first-frame state together
    pub fn animation(&self) -> (Animator, AnimationState) {
        let animator = self.animator();
        let state = animator.initial_state(self.animation.start);
        (animator, state)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Validation(message.into())
}

fn check_finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("{field} must be a finite number")))
    }
}

fn check_step(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{field} must be a positive number")))
    }
}

fn rig(intensity: f64, theta: f64, phi: f64, radius: f64, orbit: Orbit) -> LightRig {
    LightRig {
        kind: LightKind::Directional,
        intensity,
        attenuation: Attenuation::None,
        theta,
        phi,
        radius,
        orbit,
    }
}

fn sphere_preset() -> AppConfig {
    AppConfig {
        name: "sphere".to_string(),
        screen: ScreenConfig::default(),
        shape: Shape::Sphere(Sphere {
            radius: 12.0,
            ..Sphere::default()
        }),
        projection: Projection::Orthographic {
            scale_x: 2.0,
            scale_y: 1.0,
        },
        lighting: LightingModel {
            ambient: 0.1,
            specular_exponent: Some(32),
            combine: Combine::Sum,
            min_intensity: None,
        },
        lights: vec![rig(
            1.5,
            0.0,
            FRAC_PI_4,
            3.0,
            Orbit::Steady {
                d_theta: 0.2,
                d_phi: 0.16,
            },
        )],
        glyphs: GlyphConfig::default(),
        animation: AnimationConfig {
            spin: Spin::new(0.05, 0.03, 0.0),
            ..AnimationConfig::default()
        },
        render: RenderConfig::default(),
    }
}

fn sphere_basic_preset() -> AppConfig {
    AppConfig {
        name: "sphere-basic".to_string(),
        shape: Shape::Sphere(Sphere::default()),
        lighting: LightingModel::diffuse(),
        lights: vec![rig(1.0, 0.0, FRAC_PI_4, 1.0, Orbit::Swing { rate: 0.9 })],
        animation: AnimationConfig {
            spin: Spin::new(0.05, 0.1, 0.0),
            ..AnimationConfig::default()
        },
        ..sphere_preset()
    }
}

fn donut_projection() -> Projection {
    Projection::Perspective {
        k1: 15.0,
        k2: 5.0,
        aspect_x: 2.0,
        aspect_y: 1.0,
    }
}

fn torus_preset() -> AppConfig {
    AppConfig {
        name: "torus".to_string(),
        screen: ScreenConfig::default(),
        shape: Shape::Torus(Torus::default()),
        projection: donut_projection(),
        lighting: LightingModel::default(),
        lights: Vec::new(),
        glyphs: GlyphConfig {
            color: ColorMode::Solid { r: 0, g: 255, b: 0 },
            ..GlyphConfig::default()
        },
        animation: AnimationConfig {
            spin: Spin::new(0.07, 0.02, 0.0),
            ..AnimationConfig::default()
        },
        render: RenderConfig::default(),
    }
}

fn torus_lit_preset() -> AppConfig {
    AppConfig {
        name: "torus-lit".to_string(),
        shape: Shape::Torus(Torus {
            shading: TorusShading::Lit,
            ..Torus::default()
        }),
        lighting: LightingModel::default(),
        lights: vec![rig(
            1.2,
            0.0,
            FRAC_PI_3,
            1.0,
            Orbit::Damped {
                d_theta: 0.1,
                d_phi: 0.05,
                wobble: 0.5,
                radius_wobble: 0.0,
            },
        )],
        glyphs: GlyphConfig::default(),
        ..torus_preset()
    }
}

fn cube_projection(k1: f64) -> Projection {
    Projection::Perspective {
        k1,
        k2: 40.0,
        aspect_x: 2.0,
        aspect_y: 1.0,
    }
}

fn cube_faces_preset() -> AppConfig {
    AppConfig {
        name: "cube-faces".to_string(),
        screen: ScreenConfig {
            width: 80,
            height: 30,
        },
        shape: Shape::Cube(Cube::default()),
        projection: cube_projection(20.0),
        lighting: LightingModel::diffuse(),
        lights: Vec::new(),
        glyphs: GlyphConfig::default(),
        animation: AnimationConfig {
            spin: Spin::new(0.05, 0.0, 0.05),
            ..AnimationConfig::default()
        },
        render: RenderConfig::default(),
    }
}

fn cube_lit_preset() -> AppConfig {
    AppConfig {
        name: "cube-lit".to_string(),
        shape: Shape::Cube(Cube {
            shading: CubeShading::Proxy,
            ..Cube::default()
        }),
        projection: cube_projection(25.0),
        lighting: LightingModel {
            combine: Combine::Average,
            ..LightingModel::diffuse()
        },
        lights: vec![
            rig(
                1.3,
                0.0,
                FRAC_PI_4,
                20.0,
                Orbit::Damped {
                    d_theta: 0.2,
                    d_phi: 0.05,
                    wobble: 0.5,
                    radius_wobble: 0.3,
                },
            ),
            rig(
                1.3,
                0.0,
                FRAC_PI_3,
                20.0,
                Orbit::Damped {
                    d_theta: 0.15,
                    d_phi: 0.04,
                    wobble: 0.4,
                    radius_wobble: 0.3,
                },
            ),
        ],
        ..cube_faces_preset()
    }
}

fn cube_color_preset() -> AppConfig {
    let attenuated = |orbit| LightRig {
        attenuation: Attenuation::InverseSquare,
        ..rig(3.5, 0.0, FRAC_PI_4, 1.0, orbit)
    };
    AppConfig {
        name: "cube-color".to_string(),
        shape: Shape::Cube(Cube {
            step: 1.0,
            shading: CubeShading::Proxy,
            ..Cube::default()
        }),
        projection: cube_projection(25.0),
        lighting: LightingModel {
            combine: Combine::Average,
            min_intensity: Some(0.1),
            ..LightingModel::diffuse()
        },
        lights: vec![
            attenuated(Orbit::Damped {
                d_theta: 0.03,
                d_phi: 0.0,
                wobble: 0.2,
                radius_wobble: 0.0,
            }),
            attenuated(Orbit::Mirror { of: 0 }),
        ],
        glyphs: GlyphConfig {
            color: ColorMode::green_shaded(),
            ..GlyphConfig::default()
        },
        ..cube_faces_preset()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_is_valid() {
        for (name, _) in PRESETS {
            let config = AppConfig::preset(name).unwrap();
            assert_eq!(&config.name, name);
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_unknown_preset() {
        let result = AppConfig::preset("teapot");
        assert!(matches!(result.unwrap_err(), ConfigError::UnknownPreset(_)));
    }

    #[test]
    fn test_default_is_sphere() {
        let config = AppConfig::default();
        assert_eq!(config.name, "sphere");
        assert!(matches!(config.shape, Shape::Sphere(_)));
    }

    #[test]
    fn test_zero_screen_rejected() {
        let mut config = AppConfig::default();
        config.screen.width = 0;
        assert!(matches!(config.validate().unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = AppConfig::preset("cube-faces").unwrap();
        config.shape = Shape::Cube(Cube {
            step: 0.0,
            ..Cube::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_forward_mirror_rejected() {
        let mut config = AppConfig::preset("cube-color").unwrap();
        config.lights.swap(0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_intensity_rejected() {
        let mut config = AppConfig::default();
        config.lights[0].intensity = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_floor_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.lighting.min_intensity = Some(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_frame_interval_rejected() {
        let mut config = AppConfig::default();
        config.animation.frame_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scene_from_config() {
        let config = AppConfig::preset("cube-faces").unwrap();
        let scene = config.scene();
        assert_eq!((scene.width, scene.height), (80, 30));
        assert_eq!(scene.glyphs.ramp().len(), 12);
    }

    #[test]
    fn test_animation_from_config() {
        let config = AppConfig::preset("cube-lit").unwrap();
        let (animator, state) = config.animation();
        assert_eq!(state.lights.len(), 2);
        assert_eq!(animator.spin().a, 0.05);
        assert_eq!(config.frame_interval(), Duration::from_millis(30));
    }

    #[test]
    fn test_only_floor_preset_has_floor() {
        for (name, _) in PRESETS {
            let config = AppConfig::preset(name).unwrap();
            assert_eq!(config.lighting.min_intensity.is_some(), *name == "cube-color");
        }
    }
}
