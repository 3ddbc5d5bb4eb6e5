//! Captured still images as the crop engine sees them.
//!
//! The capture source (camera stream, file picker, ...) and orientation
//! normalization live outside this crate; they hand over decoded pixels that
//! are already upright.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, GenericImageView, RgbaImage};
use thiserror::Error;

use crate::geometry::{DisplayBox, NaturalSize};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to decode captured image: {message}")]
    Decode { message: String },
    #[error("failed to read captured image {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Handle to one captured image: its decoded pixels (once ready) and the box
/// the host currently renders it into.
#[derive(Debug, Clone)]
pub struct ImageReference {
    capture_id: String,
    pixels: Option<RgbaImage>,
    display_box: Option<DisplayBox>,
}

impl ImageReference {
    /// Reference whose decoding has not finished yet.
    pub fn pending(capture_id: impl Into<String>) -> Self {
        Self {
            capture_id: capture_id.into(),
            pixels: None,
            display_box: None,
        }
    }

    pub fn from_image(capture_id: impl Into<String>, image: DynamicImage) -> Self {
        let mut reference = Self::pending(capture_id);
        reference.finish_decoding(image);
        reference
    }

    pub fn decode(capture_id: impl Into<String>, bytes: &[u8]) -> CaptureResult<Self> {
        let image = image::load_from_memory(bytes).map_err(|err| CaptureError::Decode {
            message: err.to_string(),
        })?;
        Ok(Self::from_image(capture_id, image))
    }

    pub fn open(path: &Path) -> CaptureResult<Self> {
        let bytes = std::fs::read(path).map_err(|source| CaptureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::decode(new_capture_id(), &bytes)
    }

    pub fn finish_decoding(&mut self, image: DynamicImage) {
        let (width, height) = image.dimensions();
        tracing::debug!(capture_id = %self.capture_id, width, height, "captured image decoded");
        self.pixels = Some(image.into_rgba8());
    }

    pub fn capture_id(&self) -> &str {
        &self.capture_id
    }

    /// Decoded and non-empty.
    pub fn is_ready(&self) -> bool {
        self.natural_size().is_some_and(|size| !size.is_empty())
    }

    pub fn natural_size(&self) -> Option<NaturalSize> {
        self.pixels
            .as_ref()
            .map(|pixels| NaturalSize::new(pixels.width(), pixels.height()))
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }

    pub fn display_box(&self) -> Option<DisplayBox> {
        self.display_box
    }

    /// Records where layout placed the image element.
    pub fn set_display_box(&mut self, display_box: DisplayBox) {
        self.display_box = Some(display_box);
    }

    pub fn clear_display_box(&mut self) {
        self.display_box = None;
    }
}

pub fn new_capture_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("capture-{nanos}")
}
