use std::collections::HashMap;

use crate::foundation::core::{Canvas, Rgb8};
use crate::render::frame::FrameRgb;

/// Saturation cap: this many hits of one colour fully replace the background.
pub const MIX: u32 = 5;

/// Number of trajectory colours.
pub const PALETTE_LEN: usize = 8;

/// Trajectory colours, in the order used to composite a pixel.
pub const PALETTE: [Rgb8; PALETTE_LEN] = [
    Rgb8::new(128, 255, 255), // light cyan
    Rgb8::new(255, 255, 0),   // yellow
    Rgb8::new(255, 0, 0),     // red
    Rgb8::new(255, 128, 0),   // orange
    Rgb8::new(0, 255, 0),     // green
    Rgb8::new(0, 255, 255),   // cyan
    Rgb8::new(255, 128, 255), // pink
    Rgb8::new(0, 0, 255),     // blue
];

/// Blend `color` over `background` with `min(count, MIX)` parts colour and the rest background.
pub fn blend(color: Rgb8, background: Rgb8, count: u32) -> Rgb8 {
    let kc = count.min(MIX);
    let kb = MIX - kc;
    let ch = |c: u8, b: u8| ((u32::from(c) * kc + u32::from(b) * kb) / MIX).min(255) as u8;
    Rgb8::new(
        ch(color.r, background.r),
        ch(color.g, background.g),
        ch(color.b, background.b),
    )
}

/// Receiver of in-bounds samples produced by the sampler.
pub trait HitSink {
    /// Record one visit of palette colour `palette_idx` at linear pixel index `pixel`.
    fn hit(&mut self, pixel: usize, palette_idx: usize);
}

/// Per-pixel hit counts for each palette colour.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Histogram {
    cells: HashMap<usize, [u32; PALETTE_LEN]>,
}

impl Histogram {
    /// Empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of touched pixels.
    pub fn touched(&self) -> usize {
        self.cells.len()
    }

    /// Hit counts at `pixel`, indexed by palette colour.
    pub fn counts(&self, pixel: usize) -> Option<&[u32; PALETTE_LEN]> {
        self.cells.get(&pixel)
    }

    /// Add every count of `other` into `self`.
    pub fn merge(mut self, other: Histogram) -> Self {
        if self.cells.len() < other.cells.len() {
            return other.merge(self);
        }
        for (pixel, counts) in other.cells {
            let cell = self.cells.entry(pixel).or_insert([0; PALETTE_LEN]);
            for (dst, src) in cell.iter_mut().zip(counts) {
                *dst = dst.saturating_add(src);
            }
        }
        self
    }

    /// Resolve the histogram into a frame.
    ///
    /// Each touched pixel starts black and is re-blended once per colour present, in palette
    /// order, against its evolving value.
    pub fn composite(&self, canvas: Canvas) -> FrameRgb {
        let mut frame = FrameRgb::black(canvas);
        for (&pixel, counts) in &self.cells {
            let mut c = Rgb8::BLACK;
            for (color, &count) in PALETTE.iter().zip(counts) {
                if count == 0 {
                    continue;
                }
                c = blend(*color, c, count);
            }
            frame.set_pixel(pixel, c);
        }
        frame
    }
}

impl HitSink for Histogram {
    fn hit(&mut self, pixel: usize, palette_idx: usize) {
        let cell = self.cells.entry(pixel).or_insert([0; PALETTE_LEN]);
        cell[palette_idx] = cell[palette_idx].saturating_add(1);
    }
}

/// Blends each hit directly into a frame (the `Mix` policy).
#[derive(Debug)]
pub struct DirectBlend<'a> {
    frame: &'a mut FrameRgb,
}

impl<'a> DirectBlend<'a> {
    /// Blend into `frame`, whose current pixels act as background.
    pub fn new(frame: &'a mut FrameRgb) -> Self {
        Self { frame }
    }
}

impl HitSink for DirectBlend<'_> {
    fn hit(&mut self, pixel: usize, palette_idx: usize) {
        let bg = self.frame.pixel(pixel);
        self.frame.set_pixel(pixel, blend(PALETTE[palette_idx], bg, 1));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
