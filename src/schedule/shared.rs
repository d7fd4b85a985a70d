use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::foundation::core::FrameIndex;

/// State shared by a scheduler and its workers. Nothing else crosses worker boundaries.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    stop: AtomicBool,
    highest_started: AtomicU64,
    active: AtomicUsize,
}

impl SharedState {
    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Raise the progress counter to `idx`; never lowers it.
    pub(crate) fn mark_started(&self, idx: FrameIndex) {
        self.highest_started.fetch_max(idx.0, Ordering::SeqCst);
    }

    pub(crate) fn highest_started(&self) -> FrameIndex {
        FrameIndex(self.highest_started.load(Ordering::SeqCst))
    }

    pub(crate) fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Register a worker; the returned guard unregisters it exactly once when dropped.
    pub(crate) fn enter(&self) -> ActiveGuard<'_> {
        self.active.fetch_add(1, Ordering::SeqCst);
        ActiveGuard { shared: self }
    }
}

pub(crate) struct ActiveGuard<'a> {
    shared: &'a SharedState,
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
    }
}
