use crate::foundation::core::{Canvas, Coefficients};
use crate::foundation::rng::Rng64;
use crate::render::composite::{HitSink, PALETTE_LEN};

/// Trajectories started per frame.
pub const TRAJECTORIES: usize = 500;

/// Iteration steps per trajectory.
pub const STEPS_PER_TRAJECTORY: usize = 1000;

/// Starting point and colour of one trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    /// Horizontal position in `[0, 1)`.
    pub x: f64,
    /// Vertical position in `[0, 1)`.
    pub y: f64,
    /// Palette index kept for the whole trajectory.
    pub palette_idx: usize,
}

/// Seeds for one frame. Identical for every frame and every caller.
pub fn frame_seeds() -> Vec<Trajectory> {
    let mut rng = Rng64::new(Rng64::FRAME_SEED);
    (0..TRAJECTORIES)
        .map(|_| {
            let x = rng.next_f64_01();
            let y = rng.next_f64_01();
            let palette_idx = rng.next_index(PALETTE_LEN);
            Trajectory { x, y, palette_idx }
        })
        .collect()
}

/// One step of the Sin-Cos map.
///
/// `f64::fract` keeps the sign of its operand, so negative sums wrap toward zero rather than
/// into `[0, 1)`.
pub fn step(x: f64, y: f64, coefs: Coefficients) -> (f64, f64) {
    let nx = (x + (y - coefs.c2).sin()).fract();
    let ny = (y + (nx * coefs.c1).cos()).fract();
    (nx, ny)
}

/// Runs the chaotic iteration for one coefficient pair and reports in-bounds hits.
#[derive(Clone, Copy, Debug)]
pub struct AttractorSampler {
    canvas: Canvas,
    coefs: Coefficients,
}

impl AttractorSampler {
    /// Sampler for `coefs` on `canvas`.
    pub fn new(canvas: Canvas, coefs: Coefficients) -> Self {
        Self { canvas, coefs }
    }

    /// Pixel hit by normalized position `(x, y)`, if inside the canvas.
    pub fn pixel_of(&self, x: f64, y: f64) -> Option<usize> {
        let px = (x * f64::from(self.canvas.width())).floor();
        let py = (y * f64::from(self.canvas.height())).floor();
        if !px.is_finite() || !py.is_finite() {
            return None;
        }
        self.canvas.index_of(px as i64, py as i64)
    }

    /// Iterate one trajectory, feeding every in-bounds position to `sink`.
    pub fn trace(&self, seed: &Trajectory, sink: &mut impl HitSink) {
        let (mut x, mut y) = (seed.x, seed.y);
        for _ in 0..STEPS_PER_TRAJECTORY {
            if let Some(pixel) = self.pixel_of(x, y) {
                sink.hit(pixel, seed.palette_idx);
            }
            (x, y) = step(x, y, self.coefs);
        }
    }

    /// Iterate every trajectory of the frame in seed order.
    pub fn sample(&self, sink: &mut impl HitSink) {
        for seed in frame_seeds() {
            self.trace(&seed, sink);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sampler.rs"]
mod tests;
