//! Digit cells
//!
//! One [`DigitCell`] per digit position; index 0 is the least significant
//! digit, drawn at the right edge.

/// State of one digit position
///
/// `offset` is always 0 while the cell is idle, and `value` only moves
/// (by exactly one, modulo 10) when a transition completes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DigitCell {
    value: u8,
    offset: f32,
    animating: bool,
}

impl DigitCell {
    pub const fn new() -> Self {
        Self {
            value: 0,
            offset: 0.0,
            animating: false,
        }
    }

    /// The digit currently at rest in the cell
    pub fn displayed_value(&self) -> u8 {
        self.value
    }

    /// The digit sliding in from above
    pub fn preview_value(&self) -> u8 {
        (self.value + 1) % 10
    }

    /// Scroll progress in cell-height units
    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn begin(&mut self) {
        self.animating = true;
        self.offset = 0.0;
    }

    pub(crate) fn set_offset(&mut self, offset: f32) {
        debug_assert!(self.animating, "offset moved on an idle cell");
        self.offset = offset;
    }

    /// Finish the in-flight transition
    pub(crate) fn roll_forward(&mut self) {
        self.value = self.preview_value();
        self.offset = 0.0;
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_at_rest() {
        let cell = DigitCell::new();
        assert_eq!(cell.displayed_value(), 0);
        assert_eq!(cell.preview_value(), 1);
        assert_eq!(cell.offset(), 0.0);
        assert!(!cell.is_animating());
        assert_eq!(cell, DigitCell::default());
    }

    #[test]
    fn test_roll_forward_wraps() {
        let mut cell = DigitCell::new();
        for expected in (1..10).chain([0, 1]) {
            cell.begin();
            cell.set_offset(42.0);
            cell.roll_forward();
            assert_eq!(cell.displayed_value(), expected);
            assert_eq!(cell.offset(), 0.0);
            assert!(!cell.is_animating());
        }
        assert_eq!(cell.preview_value(), 2);
    }

    #[test]
    fn test_preview_of_nine_is_zero() {
        let mut cell = DigitCell::new();
        for _ in 0..9 {
            cell.begin();
            cell.roll_forward();
        }
        assert_eq!(cell.displayed_value(), 9);
        assert_eq!(cell.preview_value(), 0);
    }
}
