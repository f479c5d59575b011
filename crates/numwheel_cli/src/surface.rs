//! Single-line terminal surface
//!
//! Redraws the wheel in place with a carriage return. The most significant
//! digit is printed first, so cell 0 ends up at the right edge. A cell more
//! than halfway through its transition already shows the incoming digit.

use numwheel_core::{CellFrame, RenderSurface};
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;

pub struct TextSurface<W: Write> {
    out: W,
    digits: Vec<u8>,
    filled: bool,
    /// Elapsed tenths of a second, reported by a clock-driven wheel
    tenths: Rc<Cell<Option<u64>>>,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W, tenths: Rc<Cell<Option<u64>>>) -> Self {
        Self {
            out,
            digits: Vec::new(),
            filled: true,
            tenths,
        }
    }

    fn line(&self) -> String {
        let number: String = self
            .digits
            .iter()
            .rev()
            .map(|digit| char::from(b'0' + digit))
            .collect();
        let (open, close) = if self.filled { ('[', ']') } else { (' ', ' ') };

        match self.tenths.get() {
            Some(tenths) => format!("{open}{number}{close} {}.{}s", tenths / 10, tenths % 10),
            None => format!("{open}{number}{close}"),
        }
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn begin_frame(&mut self, filled: bool) {
        self.filled = filled;
        self.digits.clear();
    }

    fn draw_cell(&mut self, index: usize, frame: CellFrame) {
        let digit = if frame.progress() >= 0.5 {
            frame.preview
        } else {
            frame.displayed
        };
        if self.digits.len() <= index {
            self.digits.resize(index + 1, 0);
        }
        self.digits[index] = digit;
    }

    fn end_frame(&mut self) {
        let line = self.line();
        let result = write!(self.out, "\r{line}").and_then(|()| self.out.flush());
        if let Err(err) = result {
            tracing::warn!("Failed to draw wheel: {}", err);
        }
    }
}
