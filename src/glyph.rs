//! Intensity to character mapping and ANSI color decoration

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::compositor::GlyphBuffer;
use crate::lighting::clamp_unit;
use crate::vector::EPSILON;

/// Luminance ramp ordered dark to bright
pub const DEFAULT_RAMP: &str = ".,-~:;=!*#$@";

/// Character of a cell nothing was drawn into
pub const EMPTY_CELL: char = ' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 24-bit foreground escape
    pub fn escape(&self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

/// A display cell: one character with an optional color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub color: Option<Rgb>,
}

impl Glyph {
    pub fn plain(ch: char) -> Self {
        Self { ch, color: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    None,
    /// Per-cell color of a fixed hue whose brightness follows intensity,
    /// with `white_blend * intensity` added to every channel
    Shaded { hue: f64, white_blend: f64 },
    /// One color around the whole frame
    Solid { r: u8, g: u8, b: u8 },
}

impl ColorMode {
    /// Green shading used by the colored cube
    pub fn green_shaded() -> Self {
        ColorMode::Shaded {
            hue: 0.33,
            white_blend: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMapper {
    ramp: Vec<char>,
    empty: char,
    color: ColorMode,
}

impl Default for GlyphMapper {
    fn default() -> Self {
        Self::new(DEFAULT_RAMP, EMPTY_CELL, ColorMode::None)
    }
}

impl GlyphMapper {
    /// An empty `ramp` falls back to [`DEFAULT_RAMP`]
    pub fn new(ramp: &str, empty: char, color: ColorMode) -> Self {
        let ramp: Vec<char> = if ramp.is_empty() {
            DEFAULT_RAMP.chars().collect()
        } else {
            ramp.chars().collect()
        };
        Self { ramp, empty, color }
    }

    pub fn with_color(mut self, color: ColorMode) -> Self {
        self.color = color;
        self
    }

    pub fn ramp(&self) -> &[char] {
        &self.ramp
    }

    /// Ramp index for an intensity: `floor(i * (len - 1))`, clamped.
    ///
    /// Intensities that are scaled fractions of a level (`n / (len - 1)`) can
    /// land a rounding step below it; `EPSILON` keeps them on `n`.
    pub fn index(&self, intensity: f64) -> usize {
        let last = self.ramp.len() - 1;
        let scaled = (clamp_unit(intensity) * last as f64 + EPSILON).floor() as usize;
        scaled.min(last)
    }

    pub fn character(&self, intensity: f64) -> char {
        self.ramp[self.index(intensity)]
    }

    /// Glyph for an intensity, colored when the mode is shaded
    pub fn map(&self, intensity: f64) -> Glyph {
        let ch = self.character(intensity);
        let color = match self.color {
            ColorMode::Shaded { hue, white_blend } => {
                Some(shade_color(hue, white_blend, intensity))
            }
            _ => None,
        };
        Glyph { ch, color }
    }

    pub fn fixed(&self, ch: char) -> Glyph {
        Glyph::plain(ch)
    }

    pub fn empty(&self) -> Glyph {
        Glyph::plain(self.empty)
    }

    /// Text for a finished frame, one line per row, each terminated by `\n`
    pub fn render(&self, buffer: &GlyphBuffer) -> String {
        let mut out = String::with_capacity(buffer.width() * buffer.height() * 2 + buffer.height());
        if let ColorMode::Solid { r, g, b } = self.color {
            out.push_str(&Rgb::new(r, g, b).escape());
        }

        for row in buffer.rows() {
            for glyph in row {
                match glyph.color {
                    Some(rgb) => {
                        let _ = write!(out, "{}{}\x1b[0m", rgb.escape(), glyph.ch);
                    }
                    None => out.push(glyph.ch),
                }
            }
            out.push('\n');
        }

        if matches!(self.color, ColorMode::Solid { .. }) {
            out.push_str("\x1b[0m");
        }
        out
    }
}

fn shade_color(hue: f64, white_blend: f64, intensity: f64) -> Rgb {
    let value = intensity.clamp(0.0, 1.0);
    let (r, g, b) = hsv_to_rgb(hue, 1.0, value);
    let lift = intensity.max(0.0) * white_blend;
    let channel = |c: f64| ((c + lift).min(1.0) * 255.0) as u8;
    Rgb::new(channel(r), channel(g), channel(b))
}

/// HSV to RGB with every component in `[0, 1]`
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}
