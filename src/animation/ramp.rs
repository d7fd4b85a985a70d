use crate::foundation::core::{Coefficients, FrameIndex};

/// Scale of [`RampPrecision::Milli`] quantization.
const MILLI: f64 = 1000.0;

/// How coefficient endpoints are represented before interpolation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RampPrecision {
    /// Interpolate the endpoints as given.
    Exact,
    /// Quantize endpoints to thousandths (`trunc(v * 1000 + 0.5)`) and interpolate in
    /// milli-units.
    #[default]
    Milli,
}

/// Linear path of the coefficient pair across `frames` frames.
///
/// Frame `i` sits at `i / frames` of the way from `from` to `to`, so the last frame stops one
/// step short of `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoefficientRamp {
    from: Coefficients,
    to: Coefficients,
    frames: u64,
    precision: RampPrecision,
}

impl CoefficientRamp {
    /// Create a ramp. A frame count of zero is raised to one.
    pub fn new(
        from: Coefficients,
        to: Coefficients,
        frames: u64,
        precision: RampPrecision,
    ) -> Self {
        let (from, to) = match precision {
            RampPrecision::Exact => (from, to),
            RampPrecision::Milli => (to_milli(from), to_milli(to)),
        };
        Self {
            from,
            to,
            frames: frames.max(1),
            precision,
        }
    }

    /// Number of frames on the path.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Endpoint precision.
    pub fn precision(&self) -> RampPrecision {
        self.precision
    }

    /// Coefficients of frame `idx`.
    pub fn at(&self, idx: FrameIndex) -> Coefficients {
        let i = idx.0 as f64;
        let n = self.frames as f64;
        match self.precision {
            RampPrecision::Exact => Coefficients::new(
                lerp(self.from.c1, self.to.c1, i / n),
                lerp(self.from.c2, self.to.c2, i / n),
            ),
            RampPrecision::Milli => {
                let dk = 1.0 / n;
                let dm = 1.0 / MILLI;
                Coefficients::new(
                    (self.from.c1 + i * (self.to.c1 - self.from.c1) * dk) * dm,
                    (self.from.c2 + i * (self.to.c2 - self.from.c2) * dk) * dm,
                )
            }
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

// Milli endpoints are stored as whole milli-units in f64.
fn to_milli(c: Coefficients) -> Coefficients {
    let q = |v: f64| ((v * MILLI + 0.5) as i64) as f64;
    Coefficients::new(q(c.c1), q(c.c2))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ramp.rs"]
mod tests;
