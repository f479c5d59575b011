//! Render surface contract
//!
//! The core never draws. Each frame it hands a [`RenderSurface`] one
//! [`CellFrame`] per digit position, in index order (least significant
//! first). Where and how the glyphs end up is the surface's business.

/// What a surface needs to paint one cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellFrame {
    /// Digit at rest, drawn shifted down by `offset`
    pub displayed: u8,
    /// Digit sliding in from above, one cell height higher
    pub preview: u8,
    /// Scroll progress, `0.0..=cell_height`
    pub offset: f32,
    pub cell_height: f32,
}

impl CellFrame {
    /// Fraction of the transition completed (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.cell_height <= 0.0 {
            return 0.0;
        }
        (self.offset / self.cell_height).clamp(0.0, 1.0)
    }
}

/// Something that can paint a wheel
pub trait RenderSurface {
    /// Called before the first cell of a frame
    fn begin_frame(&mut self, _filled: bool) {}

    /// Paint cell `index` (0 = rightmost)
    fn draw_cell(&mut self, index: usize, frame: CellFrame);

    /// Called after the last cell of a frame
    fn end_frame(&mut self) {}
}
