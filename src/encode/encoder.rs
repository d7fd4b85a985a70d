use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{FracanimError, FracanimResult};
use crate::render::frame::RGB_CHANNELS;

/// Image file name used by single-frame renders.
pub const SINGLE_IMAGE_NAME: &str = "image.png";

/// File name of animation frame `idx`: `image00000.png`, `image00001.png`, …
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("image{:05}.png", idx.0)
}

/// Create `dir` (and parents) if needed and return it.
pub fn ensure_output_dir(dir: &Path) -> FracanimResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| FracanimError::directory(dir, e))?;
    if !dir.is_dir() {
        return Err(FracanimError::directory(
            dir,
            std::io::Error::other("path exists but is not a directory"),
        ));
    }
    Ok(dir.to_path_buf())
}

/// Writes one RGB8 image to a file.
///
/// Implementations must be callable from several writer threads at once.
pub trait FrameEncoder: Send + Sync {
    /// Encode `rgb` (tightly packed, row-major, `width * height * 3` bytes) to `path`.
    fn write_image(&self, path: &Path, width: u32, height: u32, rgb: &[u8]) -> FracanimResult<()>;
}

/// PNG encoder that never leaves a partially written frame behind.
///
/// The image is written next to its destination as `<name>.part` and renamed into place once
/// complete.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngEncoder;

impl PngEncoder {
    /// Create the encoder.
    pub fn new() -> Self {
        Self
    }
}

impl FrameEncoder for PngEncoder {
    fn write_image(&self, path: &Path, width: u32, height: u32, rgb: &[u8]) -> FracanimResult<()> {
        check_len(width, height, rgb)?;
        let tmp = partial_path(path);
        let res = image::save_buffer_with_format(
            &tmp,
            rgb,
            width,
            height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )
        .map_err(|e| FracanimError::encode(format!("write png '{}': {e}", path.display())))
        .and_then(|()| {
            std::fs::rename(&tmp, path).map_err(|e| {
                FracanimError::encode(format!("move '{}' into place: {e}", tmp.display()))
            })
        });
        if res.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        res
    }
}

/// Path of the in-progress file for `path`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn check_len(width: u32, height: u32, rgb: &[u8]) -> FracanimResult<()> {
    let expected = width as usize * height as usize * RGB_CHANNELS;
    if rgb.len() != expected {
        return Err(FracanimError::encode(format!(
            "frame buffer holds {} bytes, expected {expected} for {width}x{height} RGB8",
            rgb.len()
        )));
    }
    Ok(())
}

/// One write captured by [`InMemoryEncoder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Destination path.
    pub path: PathBuf,
    /// Image width.
    pub width: u32,
    /// Image height.
    pub height: u32,
    /// Copied RGB8 bytes.
    pub rgb: Vec<u8>,
}

/// In-memory encoder for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryEncoder {
    images: Mutex<Vec<EncodedImage>>,
}

impl InMemoryEncoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured writes, in completion order.
    pub fn images(&self) -> Vec<EncodedImage> {
        match self.images.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl FrameEncoder for InMemoryEncoder {
    fn write_image(&self, path: &Path, width: u32, height: u32, rgb: &[u8]) -> FracanimResult<()> {
        check_len(width, height, rgb)?;
        let img = EncodedImage {
            path: path.to_path_buf(),
            width,
            height,
            rgb: rgb.to_vec(),
        };
        self.images
            .lock()
            .map_err(|_| FracanimError::encode("in-memory encoder lock poisoned"))?
            .push(img);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/encoder.rs"]
mod tests;
