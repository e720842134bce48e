//! Projection of world-space points onto the character grid

use serde::{Deserialize, Serialize};

use crate::vector::{Vec3, EPSILON};

/// Which depth metric a projection produces; larger always means nearer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthConvention {
    /// View-space z, viewer on +Z
    ViewZ,
    /// `1 / (z + K2)`, viewer at `z = -K2`
    InverseDepth,
}

impl DepthConvention {
    /// Depth of a cell nothing has covered yet
    pub fn empty(self) -> f64 {
        match self {
            DepthConvention::ViewZ => f64::NEG_INFINITY,
            DepthConvention::InverseDepth => 0.0,
        }
    }
}

/// Projected cell coordinates plus the depth used for the depth test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: i64,
    pub y: i64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Projection {
    Orthographic {
        scale_x: f64,
        scale_y: f64,
    },
    Perspective {
        /// Screen-space scale
        k1: f64,
        /// Distance pushed onto every z before the divide
        k2: f64,
        /// Horizontal multiplier compensating for tall terminal cells
        #[serde(default = "default_aspect_x")]
        aspect_x: f64,
        #[serde(default = "default_aspect_y")]
        aspect_y: f64,
    },
}

fn default_aspect_x() -> f64 {
    2.0
}

fn default_aspect_y() -> f64 {
    1.0
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Orthographic {
            scale_x: 2.0,
            scale_y: 1.0,
        }
    }
}

impl Projection {
    pub fn convention(&self) -> DepthConvention {
        match self {
            Projection::Orthographic { .. } => DepthConvention::ViewZ,
            Projection::Perspective { .. } => DepthConvention::InverseDepth,
        }
    }

    /// Map a rotated point to a cell, or `None` if the point cannot be projected.
    ///
    /// Perspective rejects points on or behind the viewer plane (`z + K2 <= 0`),
    /// which also covers the undefined divide. Bounds are not checked here.
    pub fn project(&self, point: &Vec3, width: usize, height: usize) -> Option<ScreenPoint> {
        let half_w = width as f64 / 2.0;
        let half_h = height as f64 / 2.0;

        let (sx, sy, depth) = match *self {
            Projection::Orthographic { scale_x, scale_y } => {
                (half_w + scale_x * point.x, half_h - scale_y * point.y, point.z)
            }
            Projection::Perspective {
                k1,
                k2,
                aspect_x,
                aspect_y,
            } => {
                let z = point.z + k2;
                if !(z > EPSILON) {
                    return None;
                }
                let ooz = 1.0 / z;
                (
                    half_w + k1 * ooz * point.x * aspect_x,
                    half_h - k1 * ooz * point.y * aspect_y,
                    ooz,
                )
            }
        };

        if !(sx.is_finite() && sy.is_finite() && depth.is_finite()) {
            return None;
        }

        Some(ScreenPoint {
            x: sx.floor() as i64,
            y: sy.floor() as i64,
            depth,
        })
    }

    /// Whether a surface with `normal` at `position` faces the viewer
    pub fn faces_viewer(&self, position: &Vec3, normal: &Vec3) -> bool {
        match *self {
            Projection::Orthographic { .. } => normal.z > 0.0,
            Projection::Perspective { k2, .. } => {
                let eye = Vec3::new(0.0, 0.0, -k2);
                (eye - position).dot(normal) > 0.0
            }
        }
    }
}
