//! ASCII surface rasterizer
//!
//! Samples parametric surfaces (sphere, torus, cube), rotates and shades each
//! point, projects it onto a character grid and keeps the nearest point per
//! cell. Frames are plain text, optionally with ANSI truecolor escapes.

pub mod animation;
pub mod compositor;
pub mod config;
pub mod glyph;
pub mod lighting;
pub mod projection;
pub mod renderer;
pub mod shape;
pub mod terminal;
pub mod transform;
pub mod vector;

pub use animation::{AnimationState, Animator, RotationState};
pub use compositor::{FrameCompositor, GlyphBuffer};
pub use config::{AppConfig, ConfigError};
pub use glyph::GlyphMapper;
pub use renderer::{Renderer, Scene};
pub use shape::Shape;
pub use terminal::TerminalDisplay;
