use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::thread::JoinHandle;

use crate::encode::encoder::{FrameEncoder, frame_file_name};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FracanimError, FracanimResult};
use crate::render::frame::FrameRgb;

/// A frame whose file could not be written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameWriteFailure {
    /// Frame that failed.
    pub frame: FrameIndex,
    /// Destination file.
    pub path: PathBuf,
    /// Rendered error message.
    pub message: String,
}

/// Totals reported by [`AsyncFrameWriter::finish`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriterSummary {
    /// Frames written successfully.
    pub written: u64,
    /// Frames that failed to write.
    pub failures: Vec<FrameWriteFailure>,
}

impl WriterSummary {
    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Failed(f) => self.failures.push(f),
        }
    }
}

#[derive(Debug)]
struct WriteJob {
    idx: FrameIndex,
    frame: FrameRgb,
}

#[derive(Debug)]
enum WriteOutcome {
    Written,
    Failed(FrameWriteFailure),
}

/// Overlaps encoding of one worker's previous frame with rendering of its next one.
///
/// A helper thread receives jobs through a rendezvous channel: [`submit`](Self::submit) returns
/// once the helper has taken the frame, which it only does after finishing the previous write.
/// At most one write is in flight per writer and none are queued behind it.
pub struct AsyncFrameWriter {
    jobs: Option<mpsc::SyncSender<WriteJob>>,
    outcomes: mpsc::Receiver<WriteOutcome>,
    helper: Option<JoinHandle<()>>,
    summary: WriterSummary,
}

impl AsyncFrameWriter {
    /// Spawn a writer whose helper thread is called `name` and writes into `out_dir`.
    pub fn spawn(
        name: impl Into<String>,
        out_dir: impl Into<PathBuf>,
        encoder: Arc<dyn FrameEncoder>,
    ) -> FracanimResult<Self> {
        let out_dir = out_dir.into();
        let (job_tx, job_rx) = mpsc::sync_channel::<WriteJob>(0);
        let (outcome_tx, outcome_rx) = mpsc::channel::<WriteOutcome>();

        let helper = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                for job in job_rx {
                    let outcome = write_one(&out_dir, encoder.as_ref(), job);
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
            .map_err(|e| FracanimError::worker(format!("spawn frame writer thread: {e}")))?;

        Ok(Self {
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            helper: Some(helper),
            summary: WriterSummary::default(),
        })
    }

    /// Hand `frame` to the helper thread.
    ///
    /// Blocks only while this writer's previous frame is still being written.
    pub fn submit(&mut self, idx: FrameIndex, frame: FrameRgb) -> FracanimResult<()> {
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| FracanimError::worker("frame writer already finished"))?;
        jobs.send(WriteJob { idx, frame })
            .map_err(|_| FracanimError::worker("frame writer thread exited unexpectedly"))?;
        self.drain();
        Ok(())
    }

    /// Frames written so far and failures observed so far.
    pub fn summary(&self) -> &WriterSummary {
        &self.summary
    }

    /// Wait for the trailing write, stop the helper thread and return the totals.
    pub fn finish(mut self) -> FracanimResult<WriterSummary> {
        self.shutdown()?;
        Ok(std::mem::take(&mut self.summary))
    }

    fn drain(&mut self) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.summary.record(outcome);
        }
    }

    fn shutdown(&mut self) -> FracanimResult<()> {
        drop(self.jobs.take());
        let joined = match self.helper.take() {
            Some(h) => h.join(),
            None => return Ok(()),
        };
        // The helper dropped its sender, so this drains every remaining outcome.
        for outcome in self.outcomes.try_iter() {
            self.summary.record(outcome);
        }
        joined.map_err(|_| FracanimError::worker("frame writer thread panicked"))
    }
}

impl Drop for AsyncFrameWriter {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

fn write_one(out_dir: &Path, encoder: &dyn FrameEncoder, job: WriteJob) -> WriteOutcome {
    let path = out_dir.join(frame_file_name(job.idx));
    match encoder.write_image(&path, job.frame.width, job.frame.height, &job.frame.data) {
        Ok(()) => {
            tracing::debug!(frame = job.idx.0, path = %path.display(), "frame written");
            WriteOutcome::Written
        }
        Err(e) => {
            tracing::warn!(
                frame = job.idx.0,
                path = %path.display(),
                error = %e,
                "frame write failed"
            );
            WriteOutcome::Failed(FrameWriteFailure {
                frame: job.idx,
                path,
                message: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/writer.rs"]
mod tests;
