//! Multi-frame scheduling across a fixed worker pool.

/// Worker pool, progress and cancellation.
pub mod scheduler;
pub(crate) mod shared;
