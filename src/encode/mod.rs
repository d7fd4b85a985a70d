//! Frame encoding: the encoder seam, the PNG implementation and the per-worker async writer.

/// Encoder trait and built-in encoders.
pub mod encoder;
/// Per-worker overlapped frame writer.
pub mod writer;
