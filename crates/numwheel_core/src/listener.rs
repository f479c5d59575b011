//! Value-changed listener

/// Receives the raw elapsed time on every live tick of a clock-driven wheel
pub trait ValueListener {
    fn update(&mut self, elapsed_ms: u64);
}

impl<F: FnMut(u64)> ValueListener for F {
    fn update(&mut self, elapsed_ms: u64) {
        self(elapsed_ms)
    }
}
