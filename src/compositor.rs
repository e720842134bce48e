//! Depth-buffered compositing of one frame
//!
//! The compositor owns a depth buffer and a glyph buffer that are allocated
//! once and reset by overwrite at the start of every frame. Cells are indexed
//! by `x + width * y`.

use crate::glyph::Glyph;
use crate::projection::DepthConvention;

/// Best depth seen so far for every cell of the current frame
#[derive(Debug, Clone, Default)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    depths: Vec<f64>,
}

impl DepthBuffer {
    fn reset(&mut self, width: usize, height: usize, empty: f64) {
        self.width = width;
        self.height = height;
        self.depths.clear();
        self.depths.resize(width * height, empty);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.width && y < self.height {
            Some(self.depths[x + self.width * y])
        } else {
            None
        }
    }
}

/// The characters of a frame, handed to the display once finished
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlyphBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl GlyphBuffer {
    fn reset(&mut self, width: usize, height: usize, empty: Glyph) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(width * height, empty);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Glyph> {
        if x < self.width && y < self.height {
            self.cells.get(x + self.width * y)
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[Glyph] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Glyph]> {
        // chunks(0) panics, and a zero-width frame has no rows to show anyway
        let width = self.width.max(1);
        self.cells.chunks(width)
    }

    /// Rows as plain text, ignoring color
    pub fn to_plain_string(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height);
        for row in self.rows() {
            out.extend(row.iter().map(|g| g.ch));
            out.push('\n');
        }
        out
    }

    /// Number of cells holding something other than `empty`
    pub fn covered(&self, empty: char) -> usize {
        self.cells.iter().filter(|g| g.ch != empty).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Empty,
    Populating,
    Finished,
}

/// Owns the buffers for one frame at a time
#[derive(Debug, Clone)]
pub struct FrameCompositor {
    depth: DepthBuffer,
    glyphs: GlyphBuffer,
    convention: DepthConvention,
    state: FrameState,
}

impl Default for FrameCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCompositor {
    pub fn new() -> Self {
        Self {
            depth: DepthBuffer::default(),
            glyphs: GlyphBuffer::default(),
            convention: DepthConvention::ViewZ,
            state: FrameState::Empty,
        }
    }

    /// Reset both buffers to the empty sentinel of `convention`
    pub fn begin_frame(
        &mut self,
        width: usize,
        height: usize,
        convention: DepthConvention,
        empty: Glyph,
    ) {
        self.convention = convention;
        self.depth.reset(width, height, convention.empty());
        self.glyphs.reset(width, height, empty);
        self.state = FrameState::Populating;
    }

    /// Depth-test a fragment and commit it when strictly nearer.
    ///
    /// Off-grid coordinates are dropped without touching either buffer.
    /// Returns whether the cell was overwritten.
    pub fn submit(&mut self, x: i64, y: i64, depth: f64, glyph: Glyph) -> bool {
        debug_assert_eq!(self.state, FrameState::Populating, "submit outside a frame");
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.depth.width || y >= self.depth.height {
            return false;
        }

        let index = x + self.depth.width * y;
        if depth > self.depth.depths[index] {
            self.depth.depths[index] = depth;
            self.glyphs.cells[index] = glyph;
            true
        } else {
            false
        }
    }

    /// Close the frame and hand out its glyphs
    pub fn finish(&mut self) -> &GlyphBuffer {
        self.state = FrameState::Finished;
        &self.glyphs
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn convention(&self) -> DepthConvention {
        self.convention
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn glyphs(&self) -> &GlyphBuffer {
        &self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Glyph {
        Glyph::plain(' ')
    }

    #[test]
    fn test_begin_frame_resets() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(4, 3, DepthConvention::ViewZ, blank());
        assert!(compositor.submit(1, 1, 5.0, Glyph::plain('#')));
        compositor.finish();

        compositor.begin_frame(4, 3, DepthConvention::ViewZ, blank());
        assert_eq!(compositor.glyphs().get(1, 1).unwrap().ch, ' ');
        assert_eq!(compositor.depth().get(1, 1), Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_nearer_overwrites() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(4, 3, DepthConvention::ViewZ, blank());
        assert!(compositor.submit(2, 0, 1.0, Glyph::plain('a')));
        assert!(compositor.submit(2, 0, 3.0, Glyph::plain('b')));
        assert_eq!(compositor.finish().get(2, 0).unwrap().ch, 'b');
    }

    #[test]
    fn test_worse_or_equal_depth_discarded() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(4, 3, DepthConvention::InverseDepth, blank());
        assert!(compositor.submit(0, 2, 0.5, Glyph::plain('a')));
        assert!(!compositor.submit(0, 2, 0.2, Glyph::plain('b')));
        assert!(!compositor.submit(0, 2, 0.5, Glyph::plain('c')));
        assert_eq!(compositor.finish().get(0, 2).unwrap().ch, 'a');
        assert_eq!(compositor.depth().get(0, 2), Some(0.5));
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(4, 3, DepthConvention::ViewZ, blank());
        assert!(!compositor.submit(-1, 0, 9.0, Glyph::plain('x')));
        assert!(!compositor.submit(4, 0, 9.0, Glyph::plain('x')));
        assert!(!compositor.submit(0, 3, 9.0, Glyph::plain('x')));
        let glyphs = compositor.finish();
        assert_eq!(glyphs.covered(' '), 0);
    }

    #[test]
    fn test_inverse_depth_rejects_non_positive() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(2, 2, DepthConvention::InverseDepth, blank());
        assert!(!compositor.submit(0, 0, 0.0, Glyph::plain('x')));
        assert!(!compositor.submit(0, 0, -0.1, Glyph::plain('x')));
    }

    #[test]
    fn test_resize_between_frames() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(4, 3, DepthConvention::ViewZ, blank());
        compositor.finish();
        compositor.begin_frame(10, 2, DepthConvention::ViewZ, blank());
        let glyphs = compositor.finish();
        assert_eq!(glyphs.cells().len(), 20);
        assert_eq!(glyphs.rows().count(), 2);
    }

    #[test]
    fn test_state_lifecycle() {
        let mut compositor = FrameCompositor::new();
        assert_eq!(compositor.state(), FrameState::Empty);
        compositor.begin_frame(1, 1, DepthConvention::ViewZ, blank());
        assert_eq!(compositor.state(), FrameState::Populating);
        compositor.finish();
        assert_eq!(compositor.state(), FrameState::Finished);
    }

    #[test]
    fn test_plain_string_layout() {
        let mut compositor = FrameCompositor::new();
        compositor.begin_frame(3, 2, DepthConvention::ViewZ, blank());
        compositor.submit(2, 1, 0.0, Glyph::plain('@'));
        assert_eq!(compositor.finish().to_plain_string(), "   \n  @\n");
    }
}
