use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::FracanimResult;
use crate::schedule::scheduler::{AnimationReport, StepScheduler};

/// How often [`watch`] polls its stop source by default.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Poll-based "was a stop requested" query.
pub trait StopSource {
    /// `true` once a stop has been requested since the source was created.
    fn stop_requested(&mut self) -> bool;
}

impl<F> StopSource for F
where
    F: FnMut() -> bool,
{
    fn stop_requested(&mut self) -> bool {
        self()
    }
}

/// Never requests a stop.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverStop;

impl StopSource for NeverStop {
    fn stop_requested(&mut self) -> bool {
        false
    }
}

/// Requests a stop when `q` (or Ctrl+C) is pressed in the controlling terminal.
///
/// Puts the terminal in raw mode so single keys are delivered without Enter; the previous mode
/// is restored on drop. Pending key events are drained without blocking on every poll.
#[derive(Debug)]
pub struct KeyStopSource {
    requested: bool,
}

impl KeyStopSource {
    /// Switch the terminal to raw mode and start listening for the stop key.
    pub fn enable() -> FracanimResult<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| anyhow::Error::new(e).context("enable raw terminal mode"))?;
        Ok(Self { requested: false })
    }
}

impl StopSource for KeyStopSource {
    fn stop_requested(&mut self) -> bool {
        while !self.requested {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "terminal poll failed");
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) => self.requested = is_stop_key(&key),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "terminal read failed");
                    break;
                }
            }
        }
        self.requested
    }
}

impl Drop for KeyStopSource {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// `q`/`Q`, or Ctrl+C (raw mode swallows the signal). Key releases are ignored.
pub fn is_stop_key(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    match key.code {
        KeyCode::Char('q' | 'Q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Drive a running scheduler to completion from the caller's thread.
///
/// Every `interval` the stop source is polled (a request calls [`StepScheduler::stop`]) and
/// `on_progress` is called whenever the highest started frame changed.
pub fn watch(
    sched: &mut StepScheduler,
    stop: &mut dyn StopSource,
    interval: Duration,
    mut on_progress: impl FnMut(FrameIndex),
) -> AnimationReport {
    let mut last = None;
    loop {
        if stop.stop_requested() {
            return sched.stop();
        }
        std::thread::sleep(interval);
        if sched.is_finished() {
            break;
        }
        let p = sched.progress();
        if last != Some(p) {
            last = Some(p);
            on_progress(p);
        }
    }
    sched.wait()
}

#[cfg(test)]
#[path = "../../tests/unit/session/monitor.rs"]
mod tests;
