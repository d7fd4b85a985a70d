use super::*;
use crate::encode::encoder::InMemoryEncoder;
use crate::foundation::core::Canvas;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn frame() -> FrameRgb {
    FrameRgb::black(Canvas::new(4, 2).unwrap())
}

#[derive(Default)]
struct InFlightEncoder {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    done: AtomicUsize,
}

impl FrameEncoder for InFlightEncoder {
    fn write_image(&self, _: &Path, _: u32, _: u32, _: &[u8]) -> FracanimResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(15));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.done.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct GatedEncoder {
    gate: Mutex<mpsc::Receiver<()>>,
    done: AtomicUsize,
}

impl FrameEncoder for GatedEncoder {
    fn write_image(&self, _: &Path, _: u32, _: u32, _: &[u8]) -> FracanimResult<()> {
        self.gate
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| FracanimError::encode("gate closed"))?;
        self.done.fetch_add(1, Ordering::SeqCst);
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
fn writes_every_submitted_frame_with_padded_names() {
    let enc = Arc::new(InMemoryEncoder::new());
    let mut w = AsyncFrameWriter::spawn("test-writer", "frames", enc.clone()).unwrap();
    for i in [0, 3, 6] {
        w.submit(FrameIndex(i), frame()).unwrap();
    }
    let summary = w.finish().unwrap();
    assert_eq!(summary.written, 3);
    assert!(summary.failures.is_empty());

    let paths: Vec<_> = enc.images().into_iter().map(|img| img.path).collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("frames/image00000.png"),
            PathBuf::from("frames/image00003.png"),
            PathBuf::from("frames/image00006.png"),
        ]
    );
}

#[test]
fn at_most_one_write_in_flight() {
    let enc = Arc::new(InFlightEncoder::default());
    let mut w = AsyncFrameWriter::spawn("test-writer", "frames", enc.clone()).unwrap();
    for i in 0..6 {
        w.submit(FrameIndex(i), frame()).unwrap();
    }
    let summary = w.finish().unwrap();
    assert_eq!(summary.written, 6);
    assert_eq!(enc.done.load(Ordering::SeqCst), 6);
    assert_eq!(enc.max_in_flight.load(Ordering::SeqCst), 1);
}

#[test]
fn submit_returns_while_previous_write_is_pending() {
    let (open, gate) = mpsc::channel();
    let enc = Arc::new(GatedEncoder {
        gate: Mutex::new(gate),
        done: AtomicUsize::new(0),
    });
    let mut w = AsyncFrameWriter::spawn("test-writer", "frames", enc.clone()).unwrap();

    w.submit(FrameIndex(0), frame()).unwrap();
    // The helper holds frame 0 behind the gate; the caller is free to render.
    assert_eq!(enc.done.load(Ordering::SeqCst), 0);

    open.send(()).unwrap();
    open.send(()).unwrap();
    w.submit(FrameIndex(1), frame()).unwrap();
    let summary = w.finish().unwrap();
    assert_eq!(summary.written, 2);
    assert_eq!(enc.done.load(Ordering::SeqCst), 2);
}

#[test]
fn failures_are_reported_and_later_frames_still_written() {
    let mut w = AsyncFrameWriter::spawn("test-writer", "frames", Arc::new(FailOn(1))).unwrap();
    for i in 0..4 {
        w.submit(FrameIndex(i), frame()).unwrap();
    }
    let summary = w.finish().unwrap();
    assert_eq!(summary.written, 3);
    assert_eq!(summary.failures.len(), 1);
    let f = &summary.failures[0];
    assert_eq!(f.frame, FrameIndex(1));
    assert_eq!(f.path, PathBuf::from("frames/image00001.png"));
    assert!(f.message.contains("disk full"));
}

#[test]
fn finish_without_frames_is_empty() {
    let w = AsyncFrameWriter::spawn("test-writer", "frames", Arc::new(InMemoryEncoder::new()))
        .unwrap();
    assert_eq!(w.summary(), &WriterSummary::default());
    assert_eq!(w.finish().unwrap(), WriterSummary::default());
}
