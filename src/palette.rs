/// Round-robin colour assignment for per-face graphics
use std::sync::atomic::{AtomicUsize, Ordering};
use image::Rgba;

pub const PALETTE: [Rgba<u8>; 7] = [
    Rgba([0, 0, 255, 255]),     // blue
    Rgba([0, 255, 255, 255]),   // cyan
    Rgba([0, 255, 0, 255]),     // green
    Rgba([255, 0, 255, 255]),   // magenta
    Rgba([255, 0, 0, 255]),     // red
    Rgba([255, 255, 255, 255]), // white
    Rgba([255, 255, 0, 255]),   // yellow
];

/// Hands out palette colours in construction order.
///
/// Owned by the overlay container, so each container cycles independently.
/// The index is advanced before it is read: the first graphic gets
/// `PALETTE[1]`, the seventh wraps around to `PALETTE[0]`.
#[derive(Debug, Default)]
pub struct PaletteAssigner {
    index: AtomicUsize,
}

impl PaletteAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_color(&self) -> Rgba<u8> {
        let previous = self.index.fetch_add(1, Ordering::Relaxed);
        PALETTE[(previous + 1) % PALETTE.len()]
    }

    /// Number of colours handed out so far
    pub fn assigned(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }
}
