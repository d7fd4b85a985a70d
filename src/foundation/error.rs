use std::path::{Path, PathBuf};

/// Crate-wide result alias.
pub type FracanimResult<T> = Result<T, FracanimError>;

/// Errors produced by rendering, scheduling and encoding.
///
/// Cancellation is not represented here: a stopped animation is a normal outcome and is reported
/// through [`crate::AnimationReport::cancelled`].
#[derive(thiserror::Error, Debug)]
pub enum FracanimError {
    /// Invalid canvas size, thread spec or configuration file.
    #[error("configuration error: {0}")]
    Config(String),

    /// The output directory could not be created or is not a directory.
    #[error("output directory error: '{}': {source}", path.display())]
    Directory {
        /// Directory that was being prepared.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// A single frame failed to encode or write.
    #[error("encode error: {0}")]
    Encode(String),

    /// A worker or writer thread could not be spawned or panicked.
    #[error("worker error: {0}")]
    Worker(String),

    /// Anything else, with context attached by the caller.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FracanimError {
    /// Build a [`FracanimError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`FracanimError::Directory`].
    pub fn directory(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Directory {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build a [`FracanimError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FracanimError::Worker`].
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
