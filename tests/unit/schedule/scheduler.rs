use super::*;
use crate::animation::ramp::RampPrecision;
use crate::encode::encoder::{InMemoryEncoder, frame_file_name};
use crate::foundation::core::Coefficients;
use crate::render::pipeline::render_frame;
use std::path::Path;
use std::time::Duration;

fn plan(name: &str, frames: u64, workers: usize) -> AnimationPlan {
    AnimationPlan {
        out_dir: PathBuf::from("target").join("unit_schedule").join(name),
        canvas: Canvas::new(8, 6).unwrap(),
        ramp: CoefficientRamp::new(
            Coefficients::new(1.0, 0.0),
            Coefficients::new(2.0, 0.5),
            frames,
            RampPrecision::Exact,
        ),
        mode: RenderMode::Map,
        workers,
    }
}

fn written_names(enc: &InMemoryEncoder) -> Vec<String> {
    let mut names: Vec<_> = enc
        .images()
        .into_iter()
        .map(|img| img.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

struct SlowEncoder;

impl FrameEncoder for SlowEncoder {
    fn write_image(&self, _: &Path, _: u32, _: u32, _: &[u8]) -> FracanimResult<()> {
        std::thread::sleep(Duration::from_millis(20));
        Ok(())
    }
}

struct FailOn(u64);

impl FrameEncoder for FailOn {
    fn write_image(&self, path: &Path, _: u32, _: u32, _: &[u8]) -> FracanimResult<()> {
        if path.ends_with(frame_file_name(FrameIndex(self.0))) {
            return Err(FracanimError::encode("disk full"));
        }
        Ok(())
    }
}

#[test]
fn every_frame_is_written_once() {
    let enc = Arc::new(InMemoryEncoder::new());
    let mut sched = StepScheduler::start(plan("every_frame", 7, 3), enc.clone()).unwrap();
    assert_eq!(sched.worker_count(), 3);
    assert_eq!(sched.frames_total(), 7);

    let report = sched.wait();
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.frames_written, 7);
    assert!(sched.is_finished());
    assert_eq!(sched.progress(), FrameIndex(6));

    let expected: Vec<_> = (0..7).map(|i| frame_file_name(FrameIndex(i))).collect();
    assert_eq!(written_names(&enc), expected);
}

#[test]
fn frame_content_follows_the_ramp() {
    let p = plan("content", 4, 2);
    let ramp = p.ramp;
    let canvas = p.canvas;
    let enc = Arc::new(InMemoryEncoder::new());
    let mut sched = StepScheduler::start(p, enc.clone()).unwrap();
    sched.wait();

    for img in enc.images() {
        let name = img.path.file_name().unwrap().to_string_lossy().into_owned();
        let idx: u64 = name["image".len().."image".len() + 5].parse().unwrap();
        let expected = render_frame(canvas, ramp.at(FrameIndex(idx)), RenderMode::Map);
        assert_eq!(img.rgb, expected.data, "frame {idx}");
    }
}

#[test]
fn worker_count_is_clamped_to_frames() {
    let enc = Arc::new(InMemoryEncoder::new());
    let mut sched = StepScheduler::start(plan("clamp_high", 2, 16), enc.clone()).unwrap();
    assert_eq!(sched.worker_count(), 2);
    assert_eq!(sched.wait().frames_written, 2);

    let mut sched = StepScheduler::start(plan("clamp_low", 3, 0), enc).unwrap();
    assert_eq!(sched.worker_count(), 1);
    assert_eq!(sched.wait().frames_written, 3);
}

#[test]
fn stop_finishes_in_flight_work_and_reports_cancellation() {
    let mut sched = StepScheduler::start(plan("stop", 40, 2), Arc::new(SlowEncoder)).unwrap();
    let report = sched.stop();
    assert!(sched.is_finished());
    assert!(report.cancelled, "{report:?}");
    assert!(report.frames_written < 40);
    assert!(report.failures.is_empty());
    assert!(report.worker_errors.is_empty());

    // A second stop is a no-op returning the same report.
    assert_eq!(sched.stop(), report);
}

#[test]
fn write_failure_does_not_stop_siblings() {
    let mut sched = StepScheduler::start(plan("failure", 6, 3), Arc::new(FailOn(4))).unwrap();
    let report = sched.wait();
    assert!(!report.cancelled);
    assert!(!report.is_complete());
    assert_eq!(report.frames_written, 5);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].frame, FrameIndex(4));
}

#[test]
fn unusable_output_dir_fails_before_spawning() {
    let dir = PathBuf::from("target").join("unit_schedule").join("blocked");
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("not_a_dir");
    std::fs::write(&file, b"x").unwrap();

    let mut p = plan("unused", 3, 2);
    p.out_dir = file;
    let err = StepScheduler::start(p, Arc::new(InMemoryEncoder::new()))
        .err()
        .expect("directory error");
    assert!(matches!(err, FracanimError::Directory { .. }));
}

#[test]
fn dropping_a_running_scheduler_stops_it() {
    let sched = StepScheduler::start(plan("drop", 40, 2), Arc::new(SlowEncoder)).unwrap();
    let shared = Arc::clone(&sched.shared);
    drop(sched);
    assert!(shared.stop_requested());
    assert_eq!(shared.active_workers(), 0);
}
