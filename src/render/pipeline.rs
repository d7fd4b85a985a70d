use rayon::prelude::*;

use crate::foundation::core::{Canvas, Coefficients};
use crate::foundation::error::{FracanimError, FracanimResult};
use crate::render::composite::{DirectBlend, Histogram};
use crate::render::frame::{FrameRgb, RenderMode};
use crate::render::sampler::{AttractorSampler, frame_seeds};

/// Sample + composite a single frame.
///
/// This is the primary "one-shot" API. The result depends only on its arguments: seeds are
/// re-drawn from the same generator state on every call.
#[tracing::instrument(level = "debug", skip(canvas), fields(w = canvas.width(), h = canvas.height()))]
pub fn render_frame(canvas: Canvas, coefs: Coefficients, mode: RenderMode) -> FrameRgb {
    let sampler = AttractorSampler::new(canvas, coefs);
    match mode {
        RenderMode::Map => {
            let mut hist = Histogram::new();
            sampler.sample(&mut hist);
            hist.composite(canvas)
        }
        RenderMode::Mix => {
            let mut frame = FrameRgb::black(canvas);
            sampler.sample(&mut DirectBlend::new(&mut frame));
            frame
        }
    }
}

/// Render a single frame, tracing trajectories on a dedicated rayon pool.
///
/// `Map` output is identical to [`render_frame`] because histogram counts are additive.
/// `Mix` blends hits in trajectory order, so it is always sampled serially.
pub fn render_frame_parallel(
    canvas: Canvas,
    coefs: Coefficients,
    mode: RenderMode,
    threads: Option<usize>,
) -> FracanimResult<FrameRgb> {
    check_threads(threads)?;
    if mode == RenderMode::Mix {
        return Ok(render_frame(canvas, coefs, mode));
    }

    let pool = build_thread_pool(threads)?;
    let sampler = AttractorSampler::new(canvas, coefs);
    let seeds = frame_seeds();
    let hist = pool.install(|| {
        seeds
            .par_iter()
            .fold(Histogram::new, |mut hist, seed| {
                sampler.trace(seed, &mut hist);
                hist
            })
            .reduce(Histogram::new, Histogram::merge)
    });
    Ok(hist.composite(canvas))
}

/// Renders frames of one canvas size and mode; owned by each scheduler worker.
#[derive(Clone, Copy, Debug)]
pub struct FrameRenderer {
    canvas: Canvas,
    mode: RenderMode,
}

impl FrameRenderer {
    /// Renderer for `canvas` using `mode`.
    pub fn new(canvas: Canvas, mode: RenderMode) -> Self {
        Self { canvas, mode }
    }

    /// Canvas every frame is rendered on.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Compositing policy.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Render one coefficient pair.
    pub fn render(&self, coefs: Coefficients) -> FrameRgb {
        render_frame(self.canvas, coefs, self.mode)
    }
}

/// Convenience wrapper validating raw dimensions before [`render_frame`].
pub fn render(
    width: u32,
    height: u32,
    c1: f64,
    c2: f64,
    mode: RenderMode,
) -> FracanimResult<FrameRgb> {
    let canvas = Canvas::new(width, height)?;
    Ok(render_frame(canvas, Coefficients::new(c1, c2), mode))
}

fn check_threads(threads: Option<usize>) -> FracanimResult<()> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(FracanimError::config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }
    Ok(())
}

fn build_thread_pool(threads: Option<usize>) -> FracanimResult<rayon::ThreadPool> {
    check_threads(threads)?;
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| FracanimError::worker(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
