//! fracanim renders the Sin-Cos chaotic attractor and animates it across a coefficient ramp.
//!
//! # Pipeline overview
//!
//! 1. **Sample**: 500 seeded trajectories of 1000 steps each visit pixels of the canvas
//!    ([`AttractorSampler`]).
//! 2. **Composite**: hits become RGB8 pixels, either through a per-pixel colour histogram
//!    ([`RenderMode::Map`]) or by blending each hit directly ([`RenderMode::Mix`]).
//! 3. **Schedule** (animations): a [`StepScheduler`] spreads frame indices round-robin over a
//!    fixed pool of workers; each worker overlaps writing its previous frame with rendering its
//!    next one ([`AsyncFrameWriter`]).
//!
//! Rendering is deterministic: the same canvas, coefficients and mode always give the same
//! bytes, whichever worker renders the frame.
#![forbid(unsafe_code)]

mod animation;
mod foundation;
mod render;

/// Frame encoders and the per-worker async writer.
pub mod encode;
/// Multi-frame scheduling.
pub mod schedule;
/// Configuration and the caller-side polling loop.
pub mod session;

pub use animation::ramp::{CoefficientRamp, RampPrecision};
pub use foundation::core::{Canvas, Coefficients, FrameIndex, MIN_CANVAS_EDGE, Rgb8};
pub use foundation::error::{FracanimError, FracanimResult};
pub use foundation::rng::Rng64;
pub use render::composite::{
    DirectBlend, HitSink, Histogram, MIX, PALETTE, PALETTE_LEN, blend,
};
pub use render::frame::{FrameRgb, RGB_CHANNELS, RenderMode};
pub use render::pipeline::{FrameRenderer, render, render_frame, render_frame_parallel};
pub use render::sampler::{
    AttractorSampler, STEPS_PER_TRAJECTORY, TRAJECTORIES, Trajectory, frame_seeds, step,
};

pub use encode::encoder::{
    EncodedImage, FrameEncoder, InMemoryEncoder, PngEncoder, SINGLE_IMAGE_NAME,
    ensure_output_dir, frame_file_name,
};
pub use encode::writer::{AsyncFrameWriter, FrameWriteFailure, WriterSummary};
pub use schedule::scheduler::{AnimationPlan, AnimationReport, StepScheduler};
pub use session::config::{AnimationConfig, Threads, available_threads};
pub use session::monitor::{
    KeyStopSource, NeverStop, POLL_INTERVAL, StopSource, is_stop_key, watch,
};
