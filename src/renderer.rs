//! Per-frame pipeline: sample, rotate, cull, shade, project, composite
//!
//! Both paths submit fragments to the compositor in sample order from a
//! single writer, so parallel and sequential frames are byte-identical.

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::animation::AnimationState;
use crate::compositor::{FrameCompositor, GlyphBuffer};
use crate::glyph::{Glyph, GlyphMapper};
use crate::lighting::LightingModel;
use crate::projection::Projection;
use crate::shape::{Shade, ShadeContext, Shape, Surface, SurfacePoint};
use crate::transform::Rotation;

/// Everything about a frame that stays fixed across an animation
#[derive(Debug, Clone)]
pub struct Scene {
    pub shape: Shape,
    pub projection: Projection,
    pub lighting: LightingModel,
    pub glyphs: GlyphMapper,
    pub width: usize,
    pub height: usize,
}

/// A shaded, projected point ready for the depth test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: i64,
    pub y: i64,
    pub depth: f64,
    pub glyph: Glyph,
}

/// What happened to one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Drawn(Fragment),
    /// Facing away from the viewer, or dark under closed-form shading
    Culled,
    /// Degenerate geometry that cannot be projected or shaded
    Skipped,
}

/// Counters for the last rendered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub sampled: usize,
    pub culled: usize,
    pub skipped: usize,
    pub submitted: usize,
    pub written: usize,
}

/// Run one sample through rotation, culling, shading and projection
pub fn rasterize_point(
    scene: &Scene,
    surface: &dyn Surface,
    rotation: &Rotation,
    ctx: &ShadeContext<'_>,
    point: &SurfacePoint,
) -> Outcome {
    let world = rotation.transform(point);

    if surface.culls_backfaces() && !scene.projection.faces_viewer(&world.position, &world.normal) {
        return Outcome::Culled;
    }

    let glyph = match surface.shade(point, &world, ctx) {
        Some(Shade::Intensity(intensity)) => scene.glyphs.map(intensity),
        Some(Shade::Glyph(ch)) => scene.glyphs.fixed(ch),
        None if surface.culls_backfaces() => return Outcome::Skipped,
        None => return Outcome::Culled,
    };

    match scene.projection.project(&world.position, scene.width, scene.height) {
        Some(screen) => Outcome::Drawn(Fragment {
            x: screen.x,
            y: screen.y,
            depth: screen.depth,
            glyph,
        }),
        None => Outcome::Skipped,
    }
}

/// Renders frames into a reusable compositor
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    compositor: FrameCompositor,
    parallel: bool,
    stats: FrameStats,
}

impl Renderer {
    pub fn new(parallel: bool) -> Self {
        Self {
            compositor: FrameCompositor::new(),
            parallel,
            stats: FrameStats::default(),
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Render one frame and return its glyphs
    pub fn render(&mut self, scene: &Scene, state: &AnimationState) -> &GlyphBuffer {
        let surface = scene.shape.surface();
        let rotation = surface.rotation(&state.rotation);
        let ctx = ShadeContext {
            lighting: &scene.lighting,
            lights: &state.lights,
            rotation: &state.rotation,
        };

        self.compositor.begin_frame(
            scene.width,
            scene.height,
            scene.projection.convention(),
            scene.glyphs.empty(),
        );
        let mut stats = FrameStats::default();

        if self.parallel {
            let points: Vec<SurfacePoint> = surface.samples().collect();
            let outcomes: Vec<Outcome> = points
                .par_iter()
                .map(|point| rasterize_point(scene, surface, &rotation, &ctx, point))
                .collect();
            for outcome in outcomes {
                commit(&mut self.compositor, &mut stats, outcome);
            }
        } else {
            for point in surface.samples() {
                let outcome = rasterize_point(scene, surface, &rotation, &ctx, &point);
                commit(&mut self.compositor, &mut stats, outcome);
            }
        }

        self.stats = stats;
        debug!(
            frame = state.frame,
            shape = surface.name(),
            sampled = stats.sampled,
            culled = stats.culled,
            skipped = stats.skipped,
            written = stats.written,
            "Frame rendered"
        );
        trace!(rotation = ?state.rotation, lights = state.lights.len(), "Frame inputs");

        self.compositor.finish()
    }
}

fn commit(compositor: &mut FrameCompositor, stats: &mut FrameStats, outcome: Outcome) {
    stats.sampled += 1;
    match outcome {
        Outcome::Drawn(fragment) => {
            stats.submitted += 1;
            if compositor.submit(fragment.x, fragment.y, fragment.depth, fragment.glyph) {
                stats.written += 1;
            }
        }
        Outcome::Culled => stats.culled += 1,
        Outcome::Skipped => stats.skipped += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::RotationState;
    use crate::lighting::Light;
    use crate::shape::{Cube, Sphere, Torus};
    use crate::vector::{spherical, Vec3};

    fn sphere_scene(radius: f64) -> Scene {
        Scene {
            shape: Shape::Sphere(Sphere {
                radius,
                ..Sphere::default()
            }),
            projection: Projection::default(),
            lighting: LightingModel {
                specular_exponent: Some(32),
                ..LightingModel::default()
            },
            glyphs: GlyphMapper::default(),
            width: 80,
            height: 24,
        }
    }

    fn front_light() -> AnimationState {
        AnimationState {
            rotation: RotationState::default(),
            lights: vec![Light::directional(spherical(1.0, 0.0, std::f64::consts::FRAC_PI_4), 1.5)],
            frame: 0,
        }
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = Renderer::new(false);
        assert_eq!(renderer.stats(), FrameStats::default());
    }

    #[test]
    fn test_sphere_covers_center() {
        let mut renderer = Renderer::new(false);
        let scene = sphere_scene(10.0);
        let glyphs = renderer.render(&scene, &front_light());
        assert_eq!(glyphs.get(40, 12).unwrap().ch, '@');
        assert_eq!(glyphs.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn test_stats_add_up() {
        let mut renderer = Renderer::new(false);
        let scene = sphere_scene(10.0);
        renderer.render(&scene, &front_light());
        let stats = renderer.stats();
        assert_eq!(stats.sampled, stats.culled + stats.skipped + stats.submitted);
        assert!(stats.written <= stats.submitted);
        assert!(stats.culled > 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let scene = Scene {
            shape: Shape::Cube(Cube::default()),
            projection: Projection::Perspective {
                k1: 20.0,
                k2: 40.0,
                aspect_x: 2.0,
                aspect_y: 1.0,
            },
            lighting: LightingModel::default(),
            glyphs: GlyphMapper::default(),
            width: 80,
            height: 30,
        };
        let state = AnimationState {
            rotation: RotationState::new(0.8, 0.1, 0.5),
            ..AnimationState::default()
        };
        let sequential = Renderer::new(false).render(&scene, &state).clone();
        let parallel = Renderer::new(true).render(&scene, &state).clone();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_torus_closed_form_culls_dark_points() {
        let scene = Scene {
            shape: Shape::Torus(Torus::default()),
            projection: Projection::Perspective {
                k1: 15.0,
                k2: 5.0,
                aspect_x: 2.0,
                aspect_y: 1.0,
            },
            lighting: LightingModel::default(),
            glyphs: GlyphMapper::default(),
            width: 80,
            height: 24,
        };
        let mut renderer = Renderer::new(false);
        let glyphs = renderer.render(&scene, &AnimationState::default());
        assert!(glyphs.covered(' ') > 0);
        assert!(renderer.stats().culled > 0);
    }

    #[test]
    fn test_behind_viewer_is_skipped() {
        let scene = Scene {
            shape: Shape::Sphere(Sphere::default()),
            projection: Projection::Perspective {
                k1: 20.0,
                k2: 5.0,
                aspect_x: 2.0,
                aspect_y: 1.0,
            },
            lighting: LightingModel::default(),
            glyphs: GlyphMapper::default(),
            width: 80,
            height: 24,
        };
        let surface = scene.shape.surface();
        let state = RotationState::default();
        let ctx = ShadeContext {
            lighting: &scene.lighting,
            lights: &[],
            rotation: &state,
        };
        // point at z = -10 with the eye at z = -5 faces it but sits behind it
        let point = SurfacePoint::new(Vec3::new(0.0, 0.0, -10.0), Vec3::z());
        let outcome = rasterize_point(&scene, surface, &Rotation::identity(), &ctx, &point);
        assert_eq!(outcome, Outcome::Skipped);
    }
}
