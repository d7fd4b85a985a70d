use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use crate::animation::ramp::CoefficientRamp;
use crate::encode::encoder::{FrameEncoder, ensure_output_dir};
use crate::encode::writer::{AsyncFrameWriter, FrameWriteFailure, WriterSummary};
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{FracanimError, FracanimResult};
use crate::render::frame::RenderMode;
use crate::render::pipeline::FrameRenderer;
use crate::schedule::shared::SharedState;

/// Everything a scheduler needs to render an animation.
#[derive(Clone, Debug)]
pub struct AnimationPlan {
    /// Directory receiving `imageNNNNN.png` files; created if missing.
    pub out_dir: PathBuf,
    /// Frame size.
    pub canvas: Canvas,
    /// Coefficient path; its frame count is the animation length.
    pub ramp: CoefficientRamp,
    /// Compositing policy.
    pub mode: RenderMode,
    /// Requested worker count, clamped to `1..=frames`.
    pub workers: usize,
}

/// Outcome of an animation run, returned by [`StepScheduler::stop`] and
/// [`StepScheduler::wait`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnimationReport {
    /// Frames in the animation.
    pub frames_total: u64,
    /// Frames whose file was written.
    pub frames_written: u64,
    /// Frames whose write failed, ordered by frame index.
    pub failures: Vec<FrameWriteFailure>,
    /// Workers that ended with an error instead of finishing their stride.
    pub worker_errors: Vec<String>,
    /// A stop was requested before every frame was attempted.
    pub cancelled: bool,
}

impl AnimationReport {
    /// Every frame was written and nothing failed.
    pub fn is_complete(&self) -> bool {
        !self.cancelled
            && self.failures.is_empty()
            && self.worker_errors.is_empty()
            && self.frames_written == self.frames_total
    }

    fn absorb(&mut self, summary: WriterSummary) {
        self.frames_written += summary.written;
        self.failures.extend(summary.failures);
    }
}

/// Renders an animation on a fixed pool of worker threads.
///
/// Worker `k` of `W` renders frames `k, k + W, k + 2W, …` in increasing order, handing each one
/// to its own [`AsyncFrameWriter`]. Workers share exactly three values: a stop flag, the highest
/// frame index any worker has started, and the number of live workers.
///
/// Dropping a running scheduler stops it.
pub struct StepScheduler {
    shared: Arc<SharedState>,
    workers: Vec<JoinHandle<FracanimResult<WriterSummary>>>,
    worker_count: usize,
    report: AnimationReport,
}

struct WorkerCtx {
    worker: usize,
    stride: usize,
    out_dir: PathBuf,
    renderer: FrameRenderer,
    ramp: CoefficientRamp,
    encoder: Arc<dyn FrameEncoder>,
    shared: Arc<SharedState>,
}

impl StepScheduler {
    /// Create the output directory and start the workers.
    ///
    /// Returns once every worker has registered itself, so [`progress`](Self::progress) and
    /// [`is_finished`](Self::is_finished) are meaningful immediately.
    pub fn start(plan: AnimationPlan, encoder: Arc<dyn FrameEncoder>) -> FracanimResult<Self> {
        let out_dir = ensure_output_dir(&plan.out_dir)?;
        let frames_total = plan.ramp.frames();
        let max_workers = usize::try_from(frames_total).unwrap_or(usize::MAX);
        let worker_count = plan.workers.clamp(1, max_workers);
        let renderer = FrameRenderer::new(plan.canvas, plan.mode);

        tracing::info!(
            frames = frames_total,
            workers = worker_count,
            width = plan.canvas.width(),
            height = plan.canvas.height(),
            mode = ?plan.mode,
            out_dir = %out_dir.display(),
            "starting animation"
        );

        let mut sched = Self {
            shared: Arc::new(SharedState::default()),
            workers: Vec::with_capacity(worker_count),
            worker_count,
            report: AnimationReport {
                frames_total,
                ..AnimationReport::default()
            },
        };

        for worker in 0..worker_count {
            let ctx = WorkerCtx {
                worker,
                stride: worker_count,
                out_dir: out_dir.clone(),
                renderer,
                ramp: plan.ramp,
                encoder: Arc::clone(&encoder),
                shared: Arc::clone(&sched.shared),
            };
            let (ready_tx, ready_rx) = mpsc::sync_channel::<()>(1);
            let spawned = std::thread::Builder::new()
                .name(format!("fracanim-worker-{worker}"))
                .spawn(move || run_worker(ctx, ready_tx));
            match spawned {
                Ok(handle) => sched.workers.push(handle),
                Err(e) => {
                    sched.stop();
                    return Err(FracanimError::worker(format!(
                        "spawn worker {worker} of {worker_count}: {e}"
                    )));
                }
            }
            // Wait until the worker registered itself before starting the next one. A worker
            // that dies first drops the sender, which also ends the wait.
            let _ = ready_rx.recv();
        }

        Ok(sched)
    }

    /// Highest frame index any worker has started. Never decreases.
    pub fn progress(&self) -> FrameIndex {
        self.shared.highest_started()
    }

    /// `true` once every worker has exited.
    pub fn is_finished(&self) -> bool {
        self.shared.active_workers() == 0
    }

    /// Number of frames in the animation.
    pub fn frames_total(&self) -> u64 {
        self.report.frames_total
    }

    /// Number of worker threads started.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Request a stop and block until every worker exited and its trailing write completed.
    ///
    /// Frames already being rendered or written are finished; no new frame is started.
    pub fn stop(&mut self) -> AnimationReport {
        if !self.workers.is_empty() {
            tracing::info!(progress = self.progress().0, "stopping animation");
        }
        self.shared.request_stop();
        self.join_workers()
    }

    /// Block until every worker has finished its stride, without requesting a stop.
    pub fn wait(&mut self) -> AnimationReport {
        self.join_workers()
    }

    fn join_workers(&mut self) -> AnimationReport {
        if self.workers.is_empty() {
            return self.report.clone();
        }
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(Ok(summary)) => self.report.absorb(summary),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "worker ended with an error");
                    self.report.worker_errors.push(e.to_string());
                }
                Err(_) => {
                    tracing::warn!("worker thread panicked");
                    self.report
                        .worker_errors
                        .push(FracanimError::worker("worker thread panicked").to_string());
                }
            }
        }
        self.report.failures.sort_by_key(|f| f.frame);

        let attempted = self.report.frames_written + self.report.failures.len() as u64;
        self.report.cancelled =
            self.shared.stop_requested() && attempted < self.report.frames_total;

        tracing::info!(
            written = self.report.frames_written,
            failed = self.report.failures.len(),
            cancelled = self.report.cancelled,
            "animation finished"
        );
        self.report.clone()
    }
}

impl Drop for StepScheduler {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            let _ = self.stop();
        }
    }
}

fn run_worker(ctx: WorkerCtx, ready: mpsc::SyncSender<()>) -> FracanimResult<WriterSummary> {
    let shared = Arc::clone(&ctx.shared);
    let _active = shared.enter();
    let _ = ready.send(());
    drop(ready);

    let mut writer = AsyncFrameWriter::spawn(
        format!("fracanim-writer-{}", ctx.worker),
        ctx.out_dir.clone(),
        Arc::clone(&ctx.encoder),
    )?;

    let frames = ctx.ramp.frames();
    let mut idx = ctx.worker as u64;
    while idx < frames {
        if shared.stop_requested() {
            tracing::debug!(worker = ctx.worker, next = idx, "stop observed");
            break;
        }
        let frame_idx = FrameIndex(idx);
        shared.mark_started(frame_idx);

        let coefs = ctx.ramp.at(frame_idx);
        tracing::debug!(
            worker = ctx.worker,
            frame = idx,
            c1 = coefs.c1,
            c2 = coefs.c2,
            "rendering frame"
        );
        let frame = ctx.renderer.render(coefs);
        writer.submit(frame_idx, frame)?;

        idx += ctx.stride as u64;
    }

    writer.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
