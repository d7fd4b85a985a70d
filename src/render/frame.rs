use crate::foundation::core::{Canvas, Rgb8};

/// Bytes per pixel of [`FrameRgb::data`].
pub const RGB_CHANNELS: usize = 3;

/// A rendered frame as opaque RGB8 pixels.
///
/// Frames are owned by the worker that rendered them until they are moved into its writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// All-black frame covering `canvas`.
    pub fn black(canvas: Canvas) -> Self {
        Self {
            width: canvas.width(),
            height: canvas.height(),
            data: vec![0; canvas.area() * RGB_CHANNELS],
        }
    }

    /// Colour at linear pixel index `idx`.
    pub fn pixel(&self, idx: usize) -> Rgb8 {
        let o = idx * RGB_CHANNELS;
        Rgb8::new(self.data[o], self.data[o + 1], self.data[o + 2])
    }

    /// Colour at `(x, y)`.
    pub fn pixel_at(&self, x: u32, y: u32) -> Rgb8 {
        self.pixel(y as usize * self.width as usize + x as usize)
    }

    /// Overwrite the colour at linear pixel index `idx`.
    pub fn set_pixel(&mut self, idx: usize, c: Rgb8) {
        let o = idx * RGB_CHANNELS;
        self.data[o] = c.r;
        self.data[o + 1] = c.g;
        self.data[o + 2] = c.b;
    }

    /// Number of non-black pixels.
    pub fn lit_pixels(&self) -> usize {
        self.data
            .chunks_exact(RGB_CHANNELS)
            .filter(|px| px.iter().any(|&c| c != 0))
            .count()
    }
}

/// How hits are resolved into pixel colours.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Accumulate a per-pixel colour histogram, then blend each colour once with its
    /// saturated count.
    #[default]
    Map,
    /// Blend every hit straight into the frame with weight one.
    Mix,
}
