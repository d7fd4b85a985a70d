use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::animation::ramp::{CoefficientRamp, RampPrecision};
use crate::foundation::core::{Canvas, Coefficients};
use crate::foundation::error::{FracanimError, FracanimResult};
use crate::render::frame::RenderMode;
use crate::schedule::scheduler::AnimationPlan;

/// Hardware threads available to this process (at least one).
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Requested worker count.
///
/// Written as `"max"`, `"half"` or a number, both on the command line and in config files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ThreadsRepr", into = "ThreadsRepr")]
pub enum Threads {
    /// One worker per available hardware thread.
    #[default]
    Max,
    /// Half the available hardware threads.
    Half,
    /// An explicit count.
    Count(usize),
}

impl Threads {
    /// Resolve against `available` hardware threads.
    ///
    /// Results below one fall back to `available`; results above it are capped to it.
    pub fn resolve(self, available: usize) -> usize {
        let available = available.max(1);
        let n = match self {
            Threads::Max => available,
            Threads::Half => available / 2,
            Threads::Count(n) => n,
        };
        if n < 1 { available } else { n.min(available) }
    }
}

impl Threads {
    /// Explicit count; zero and negative counts become `Count(0)`, which resolves to
    /// all available threads.
    pub fn from_count(n: i64) -> Self {
        Threads::Count(usize::try_from(n).unwrap_or(0))
    }
}

impl FromStr for Threads {
    type Err = FracanimError;

    fn from_str(s: &str) -> FracanimResult<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("max") {
            return Ok(Threads::Max);
        }
        if s.to_ascii_lowercase().starts_with("half") {
            return Ok(Threads::Half);
        }
        s.parse::<i64>().map(Threads::from_count).map_err(|_| {
            FracanimError::config(format!(
                "threads must be a number, 'half' or 'max' (got '{s}')"
            ))
        })
    }
}

impl fmt::Display for Threads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threads::Max => f.write_str("max"),
            Threads::Half => f.write_str("half"),
            Threads::Count(n) => write!(f, "{n}"),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum ThreadsRepr {
    Count(i64),
    Named(String),
}

impl TryFrom<ThreadsRepr> for Threads {
    type Error = FracanimError;

    fn try_from(r: ThreadsRepr) -> FracanimResult<Self> {
        match r {
            ThreadsRepr::Count(n) => Ok(Threads::from_count(n)),
            ThreadsRepr::Named(s) => s.parse(),
        }
    }
}

impl From<Threads> for ThreadsRepr {
    fn from(t: Threads) -> Self {
        match t {
            Threads::Count(n) => ThreadsRepr::Count(i64::try_from(n).unwrap_or(i64::MAX)),
            other => ThreadsRepr::Named(other.to_string()),
        }
    }
}

/// Settings for a single image or an animation.
///
/// Every field has a default, so a config file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Output directory, created if missing.
    pub out_dir: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Number of frames; anything below `1` is treated as `1`.
    pub steps: i64,
    /// Start value of coefficient 1.
    pub coef1: f64,
    /// Start value of coefficient 2.
    pub coef2: f64,
    /// End value of coefficient 1.
    pub coef1_end: f64,
    /// End value of coefficient 2.
    pub coef2_end: f64,
    /// Compositing policy.
    pub mode: RenderMode,
    /// Worker count.
    pub threads: Threads,
    /// Endpoint precision of the coefficient ramp.
    pub precision: RampPrecision,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            width: 1280,
            height: 720,
            steps: 1,
            coef1: 1.0,
            coef2: 0.0,
            coef1_end: 2.0,
            coef2_end: 0.5,
            mode: RenderMode::Map,
            threads: Threads::Max,
            precision: RampPrecision::Milli,
        }
    }
}

impl AnimationConfig {
    /// Parse a JSON config.
    pub fn from_json_str(s: &str) -> FracanimResult<Self> {
        serde_json::from_str(s).map_err(|e| FracanimError::config(format!("parse config: {e}")))
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> FracanimResult<Self> {
        let s = std::fs::read_to_string(path).map_err(|e| {
            FracanimError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&s)
    }

    /// Validated canvas.
    pub fn canvas(&self) -> FracanimResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Frame count, corrected to at least one.
    pub fn steps(&self) -> u64 {
        self.steps.max(1).unsigned_abs()
    }

    /// Coefficients of a single image (the ramp start).
    pub fn start_coefficients(&self) -> Coefficients {
        Coefficients::new(self.coef1, self.coef2)
    }

    /// Coefficient path across all frames.
    pub fn ramp(&self) -> CoefficientRamp {
        CoefficientRamp::new(
            self.start_coefficients(),
            Coefficients::new(self.coef1_end, self.coef2_end),
            self.steps(),
            self.precision,
        )
    }

    /// Build a scheduler plan, resolving the worker count against `available` threads.
    pub fn plan(&self, available: usize) -> FracanimResult<AnimationPlan> {
        Ok(AnimationPlan {
            out_dir: self.out_dir.clone(),
            canvas: self.canvas()?,
            ramp: self.ramp(),
            mode: self.mode,
            workers: self.threads.resolve(available),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
