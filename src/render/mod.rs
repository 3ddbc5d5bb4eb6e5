//! Applies a committed display-space crop to the source image at native resolution.

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage, RgbaImage};
use thiserror::Error;

use crate::capture::ImageReference;
use crate::geometry::{
    to_natural_space, CropRect, DisplaySize, NaturalSize, PixelRegion, ScaleFactors,
};

pub const DEFAULT_JPEG_QUALITY: u8 = 95;
const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image is not ready: still decoding, empty, or not laid out")]
    ImageNotReady,
    #[error("cannot allocate a {width}x{height} output surface")]
    RenderSurfaceUnavailable { width: u32, height: u32 },
    #[error("failed to encode cropped image: {0}")]
    Encode(#[from] image::ImageError),
}

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Cropped pixels together with the natural-space region they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CroppedImage {
    pub region: PixelRegion,
    pub pixels: RgbaImage,
}

/// Maps a display-space rectangle onto whole pixels of the natural image.
///
/// Edges are rounded to the nearest pixel and clamped to the image; the
/// result is always at least one pixel wide and tall.
pub fn natural_region(
    rect: CropRect,
    display: DisplaySize,
    natural: NaturalSize,
) -> Option<PixelRegion> {
    let scale = ScaleFactors::between(natural, display)?;
    let scaled = to_natural_space(rect, scale);

    let left = pixel_edge(scaled.x, natural.width.saturating_sub(1));
    let top = pixel_edge(scaled.y, natural.height.saturating_sub(1));
    let right = pixel_edge(scaled.right(), natural.width).max(left.saturating_add(1));
    let bottom = pixel_edge(scaled.bottom(), natural.height).max(top.saturating_add(1));

    Some(PixelRegion::new(left, top, right - left, bottom - top))
}

fn pixel_edge(value: f64, max: u32) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, f64::from(max)) as u32
}

/// Copies `rect` (display space) out of the reference's pixels, 1:1 with no stretching.
pub fn render_crop(image: &ImageReference, rect: CropRect) -> RenderResult<CroppedImage> {
    let pixels = image
        .pixels()
        .filter(|_| image.is_ready())
        .ok_or(RenderError::ImageNotReady)?;
    let display = image
        .display_box()
        .map(|display_box| display_box.size())
        .filter(|size| size.is_laid_out())
        .ok_or(RenderError::ImageNotReady)?;
    let natural = NaturalSize::new(pixels.width(), pixels.height());
    let region = natural_region(rect, display, natural).ok_or(RenderError::ImageNotReady)?;

    let cropped = copy_region(pixels, region)?;
    tracing::info!(
        capture_id = image.capture_id(),
        ?rect,
        ?region,
        "crop rendered at native resolution"
    );
    Ok(CroppedImage {
        region,
        pixels: cropped,
    })
}

fn copy_region(source: &RgbaImage, region: PixelRegion) -> RenderResult<RgbaImage> {
    let unavailable = RenderError::RenderSurfaceUnavailable {
        width: region.width,
        height: region.height,
    };
    if region.width == 0
        || region.height == 0
        || u64::from(region.width) * u64::from(region.height) > MAX_OUTPUT_PIXELS
    {
        return Err(unavailable);
    }
    let fits_x = region
        .x
        .checked_add(region.width)
        .is_some_and(|right| right <= source.width());
    let fits_y = region
        .y
        .checked_add(region.height)
        .is_some_and(|bottom| bottom <= source.height());
    if !fits_x || !fits_y {
        return Err(unavailable);
    }
    Ok(imageops::crop_imm(source, region.x, region.y, region.width, region.height).to_image())
}

/// Encodes to baseline JPEG; alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> RenderResult<Vec<u8>> {
    let rgb: RgbImage = image.convert();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).encode_image(&rgb)?;
    Ok(bytes)
}
