//! Caller-side orchestration: configuration and the progress/stop polling loop.

/// Config files, thread resolution and plan building.
pub mod config;
/// Stop sources and the polling loop.
pub mod monitor;
