use crate::foundation::error::{FracanimError, FracanimResult};

/// Smallest accepted canvas edge, in pixels.
pub const MIN_CANVAS_EDGE: u32 = 2;

/// Absolute 0-based frame index within an animation.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output canvas dimensions in pixels.
///
/// Construct through [`Canvas::new`], which enforces the minimum edge length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "CanvasDef")]
pub struct Canvas {
    width: u32,
    height: u32,
}

#[derive(serde::Deserialize)]
struct CanvasDef {
    width: u32,
    height: u32,
}

impl TryFrom<CanvasDef> for Canvas {
    type Error = FracanimError;

    fn try_from(def: CanvasDef) -> FracanimResult<Self> {
        Self::new(def.width, def.height)
    }
}

impl Canvas {
    /// Create a validated canvas; both edges must be at least [`MIN_CANVAS_EDGE`].
    pub fn new(width: u32, height: u32) -> FracanimResult<Self> {
        if width < MIN_CANVAS_EDGE || height < MIN_CANVAS_EDGE {
            return Err(FracanimError::config(format!(
                "width and height must be at least {MIN_CANVAS_EDGE} pixels (got {width}x{height})"
            )));
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    pub fn width(self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn area(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Linear row-major index of `(x, y)`, or `None` outside the canvas.
    pub fn index_of(self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

/// Opaque 8-bit RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Black, the background of every frame.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a colour from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The two free coefficients of the Sin-Cos map for one frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coefficients {
    /// Multiplier inside the cosine term.
    pub c1: f64,
    /// Phase offset inside the sine term.
    pub c2: f64,
}

impl Coefficients {
    /// Create a coefficient pair.
    pub const fn new(c1: f64, c2: f64) -> Self {
        Self { c1, c2 }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
