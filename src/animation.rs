//! Animation state and the driver that advances it between frames
//!
//! [`AnimationState`] is everything a frame needs from outside the pipeline:
//! the rotation angles and the lights. The [`Animator`] owns the per-frame
//! increments and the light orbits and is the only thing that mutates it.

use std::f64::consts::{FRAC_PI_6, PI, TAU};

use serde::{Deserialize, Serialize};

use crate::lighting::{Attenuation, Light, LightKind};
use crate::vector::{spherical, Vec3};

/// Rotation angles in radians; they grow without bound and wrap through trig
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RotationState {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl RotationState {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }
}

/// Per-frame rotation increments
pub type Spin = RotationState;

/// Inputs for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationState {
    pub rotation: RotationState,
    pub lights: Vec<Light>,
    pub frame: u64,
}

/// Lowest polar angle a damped orbit may reach
pub const MIN_ORBIT_PHI: f64 = FRAC_PI_6;
/// Highest polar angle a damped orbit may reach
pub const MAX_ORBIT_PHI: f64 = 5.0 * FRAC_PI_6;

/// How a light moves between frames
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Orbit {
    #[default]
    Fixed,
    /// Both angles advance by constant amounts
    Steady { d_theta: f64, d_phi: f64 },
    /// Azimuth advances, polar angle drifts with a sine wobble and is clamped
    /// to [`MIN_ORBIT_PHI`, `MAX_ORBIT_PHI`]; the radius breathes with the azimuth
    Damped {
        d_theta: f64,
        #[serde(default)]
        d_phi: f64,
        #[serde(default)]
        wobble: f64,
        #[serde(default)]
        radius_wobble: f64,
    },
    /// Always opposite an earlier light
    Mirror { of: usize },
    /// Angles follow the animation clock: `theta = 2pi sin(rate t)`, `phi = pi cos(rate t)`
    Swing { rate: f64 },
}

/// A light placed by spherical angles and moved by an [`Orbit`]
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LightRig {
    pub kind: LightKind,
    pub intensity: f64,
    pub attenuation: Attenuation,
    pub theta: f64,
    pub phi: f64,
    pub radius: f64,
    pub orbit: Orbit,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            kind: LightKind::Directional,
            intensity: 1.0,
            attenuation: Attenuation::None,
            theta: 0.0,
            phi: PI / 4.0,
            radius: 1.0,
            orbit: Orbit::Fixed,
        }
    }
}

impl LightRig {
    fn effective_radius(&self) -> f64 {
        match self.orbit {
            Orbit::Damped { radius_wobble, .. } => {
                self.radius * (1.0 + radius_wobble * self.theta.sin())
            }
            _ => self.radius,
        }
    }

    fn vector(&self) -> Vec3 {
        spherical(self.effective_radius(), self.theta, self.phi)
    }

    fn light(&self, vector: Vec3) -> Light {
        Light {
            kind: self.kind,
            vector,
            intensity: self.intensity,
            attenuation: self.attenuation,
        }
    }

    fn step(&mut self, clock: f64) {
        match self.orbit {
            Orbit::Fixed | Orbit::Mirror { .. } => {}
            Orbit::Steady { d_theta, d_phi } => {
                self.theta += d_theta;
                self.phi += d_phi;
            }
            Orbit::Damped {
                d_theta,
                d_phi,
                wobble,
                ..
            } => {
                self.theta += d_theta;
                self.phi += d_phi + wobble * self.theta.sin();
                self.phi = self.phi.clamp(MIN_ORBIT_PHI, MAX_ORBIT_PHI);
            }
            Orbit::Swing { rate } => {
                self.theta = (clock * rate).sin() * TAU;
                self.phi = (clock * rate).cos() * PI;
            }
        }
    }
}

/// Owns the per-frame increments and advances an [`AnimationState`]
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    spin: Spin,
    rigs: Vec<LightRig>,
    /// Seconds of animation time per frame
    interval: f64,
    clock: f64,
}

impl Animator {
    pub fn new(spin: Spin, rigs: Vec<LightRig>, interval: f64) -> Self {
        let mut animator = Self {
            spin,
            rigs,
            interval,
            clock: 0.0,
        };
        animator.settle();
        animator
    }

    pub fn spin(&self) -> &Spin {
        &self.spin
    }

    pub fn rigs(&self) -> &[LightRig] {
        &self.rigs
    }

    /// State for the first frame
    pub fn initial_state(&self, rotation: RotationState) -> AnimationState {
        AnimationState {
            rotation,
            lights: self.lights(),
            frame: 0,
        }
    }

    /// Move everything forward by one frame
    pub fn advance(&mut self, state: &mut AnimationState) {
        state.rotation.a += self.spin.a;
        state.rotation.b += self.spin.b;
        state.rotation.c += self.spin.c;

        self.clock += self.interval;
        for rig in &mut self.rigs {
            rig.step(self.clock);
        }
        state.lights = self.lights();
        state.frame += 1;
    }

    /// Swing rigs take their angles from the clock, including at time zero
    fn settle(&mut self) {
        for rig in &mut self.rigs {
            if let Orbit::Swing { .. } = rig.orbit {
                rig.step(self.clock);
            }
        }
    }

    fn lights(&self) -> Vec<Light> {
        let mut lights: Vec<Light> = Vec::with_capacity(self.rigs.len());
        for rig in &self.rigs {
            let vector = match rig.orbit {
                Orbit::Mirror { of } => match lights.get(of) {
                    Some(source) => -source.vector,
                    None => rig.vector(),
                },
                _ => rig.vector(),
            };
            lights.push(rig.light(vector));
        }
        lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig(orbit: Orbit) -> LightRig {
        LightRig {
            orbit,
            ..LightRig::default()
        }
    }

    #[test]
    fn test_spin_accumulates() {
        let mut animator = Animator::new(Spin::new(0.05, 0.03, 0.0), Vec::new(), 0.03);
        let mut state = animator.initial_state(RotationState::default());
        for _ in 0..10 {
            animator.advance(&mut state);
        }
        assert!((state.rotation.a - 0.5).abs() < 1e-12);
        assert!((state.rotation.b - 0.3).abs() < 1e-12);
        assert_eq!(state.rotation.c, 0.0);
        assert_eq!(state.frame, 10);
    }

    #[test]
    fn test_fixed_light_stays() {
        let mut animator = Animator::new(Spin::default(), vec![rig(Orbit::Fixed)], 0.03);
        let mut state = animator.initial_state(RotationState::default());
        let before = state.lights[0];
        animator.advance(&mut state);
        assert_eq!(state.lights[0], before);
    }

    #[test]
    fn test_initial_light_from_angles() {
        let animator = Animator::new(Spin::default(), vec![rig(Orbit::Fixed)], 0.03);
        let state = animator.initial_state(RotationState::default());
        let v = state.lights[0].vector;
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!((v - Vec3::new(h, 0.0, h)).norm() < 1e-12);
    }

    #[test]
    fn test_steady_orbit_moves() {
        let mut animator = Animator::new(
            Spin::default(),
            vec![rig(Orbit::Steady {
                d_theta: 0.2,
                d_phi: 0.16,
            })],
            0.03,
        );
        let mut state = animator.initial_state(RotationState::default());
        animator.advance(&mut state);
        let r = animator.rigs()[0];
        assert!((r.theta - 0.2).abs() < 1e-12);
        assert!((r.phi - (PI / 4.0 + 0.16)).abs() < 1e-12);
    }

    #[test]
    fn test_damped_orbit_stays_in_band() {
        let mut animator = Animator::new(
            Spin::default(),
            vec![rig(Orbit::Damped {
                d_theta: 0.2,
                d_phi: 0.05,
                wobble: 0.5,
                radius_wobble: 0.3,
            })],
            0.03,
        );
        let mut state = animator.initial_state(RotationState::default());
        for _ in 0..500 {
            animator.advance(&mut state);
            let phi = animator.rigs()[0].phi;
            assert!((MIN_ORBIT_PHI..=MAX_ORBIT_PHI).contains(&phi));
        }
    }

    #[test]
    fn test_damped_radius_breathes() {
        let mut damped = rig(Orbit::Damped {
            d_theta: 0.0,
            d_phi: 0.0,
            wobble: 0.0,
            radius_wobble: 0.3,
        });
        damped.radius = 20.0;
        damped.theta = PI / 2.0;
        assert!((damped.effective_radius() - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_mirror_opposes_source() {
        let mut animator = Animator::new(
            Spin::default(),
            vec![
                rig(Orbit::Steady {
                    d_theta: 0.03,
                    d_phi: 0.0,
                }),
                rig(Orbit::Mirror { of: 0 }),
            ],
            0.03,
        );
        let mut state = animator.initial_state(RotationState::default());
        for _ in 0..5 {
            animator.advance(&mut state);
            assert_eq!(state.lights[1].vector, -state.lights[0].vector);
        }
    }

    #[test]
    fn test_swing_follows_clock() {
        let mut animator =
            Animator::new(Spin::default(), vec![rig(Orbit::Swing { rate: 0.9 })], 0.5);
        let mut state = animator.initial_state(RotationState::default());
        assert_eq!(animator.rigs()[0].theta, 0.0);
        assert!((animator.rigs()[0].phi - PI).abs() < 1e-12);
        animator.advance(&mut state);
        let expected = (0.5f64 * 0.9).sin() * TAU;
        assert!((animator.rigs()[0].theta - expected).abs() < 1e-12);
    }

    #[test]
    fn test_advance_is_deterministic() {
        let build = || {
            Animator::new(
                Spin::new(0.05, 0.0, 0.05),
                vec![rig(Orbit::Damped {
                    d_theta: 0.1,
                    d_phi: 0.05,
                    wobble: 0.5,
                    radius_wobble: 0.3,
                })],
                0.03,
            )
        };
        let (mut first, mut second) = (build(), build());
        let mut a = first.initial_state(RotationState::default());
        let mut b = second.initial_state(RotationState::default());
        for _ in 0..20 {
            first.advance(&mut a);
            second.advance(&mut b);
        }
        assert_eq!(a, b);
    }
}
