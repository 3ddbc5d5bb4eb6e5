//! Crop rectangle model: invariants, handles and default placement.

mod handle;
mod resize;

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{CropRect, DisplaySize};

pub use handle::{handle_anchor_points, handle_at_point, Handle, HandleHitArea, ParseHandleError};
pub use resize::{resize_from_handle, sweep_selection};

pub const DEFAULT_MIN_CROP_SIZE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CropError {
    #[error("display bounds are not laid out yet")]
    BoundsUnknown,
}

pub type CropResult<T> = std::result::Result<T, CropError>;

/// Share of the displayed image covered by a default rectangle, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CropFractions {
    pub width: f64,
    pub height: f64,
}

impl CropFractions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Keeps each fraction inside `(0, 1]`; unusable values fall back to full coverage.
    pub fn normalized(self) -> Self {
        Self::new(normalize_fraction(self.width), normalize_fraction(self.height))
    }
}

fn normalize_fraction(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.min(1.0)
    } else {
        1.0
    }
}

pub(crate) fn usable_extent(extent: f64) -> f64 {
    if extent.is_finite() {
        extent.max(0.0)
    } else {
        0.0
    }
}

/// Minimum size that still fits inside `extent`.
pub(crate) fn effective_floor(min_size: f64, extent: f64) -> f64 {
    usable_extent(min_size).min(usable_extent(extent))
}

fn clamp_axis(position: f64, length: f64, extent: f64, min_size: f64) -> (f64, f64) {
    let extent = usable_extent(extent);
    let floor = effective_floor(min_size, extent);
    let length = if length.is_finite() {
        length.max(floor).min(extent)
    } else {
        floor
    };
    let position = if position.is_finite() {
        position.clamp(0.0, extent - length)
    } else {
        0.0
    };
    (position, length)
}

/// Returns the closest rectangle that honours the size floor and stays inside `bounds`.
///
/// Undersized or non-finite dimensions are held at the floor instead of being
/// rejected; when `bounds` itself is smaller than the floor the rectangle spans
/// the whole axis.
pub fn clamp(rect: CropRect, bounds: DisplaySize, min_size: f64) -> CropRect {
    let (x, width) = clamp_axis(rect.x, rect.width, bounds.width, min_size);
    let (y, height) = clamp_axis(rect.y, rect.height, bounds.height, min_size);
    CropRect::new(x, y, width, height)
}

/// Centered rectangle covering `fractions` of `bounds`.
pub fn default_rectangle(bounds: DisplaySize, fractions: CropFractions) -> CropRect {
    let fractions = fractions.normalized();
    let width = usable_extent(bounds.width) * fractions.width;
    let height = usable_extent(bounds.height) * fractions.height;
    CropRect::new(
        (usable_extent(bounds.width) - width) / 2.0,
        (usable_extent(bounds.height) - height) / 2.0,
        width,
        height,
    )
}

/// Starting rectangle for a crop session, or `BoundsUnknown` while layout is pending.
pub fn initial_rectangle(
    bounds: Option<DisplaySize>,
    fractions: CropFractions,
    min_size: f64,
) -> CropResult<CropRect> {
    let bounds = bounds
        .filter(|bounds| bounds.is_laid_out())
        .ok_or(CropError::BoundsUnknown)?;
    Ok(clamp(default_rectangle(bounds, fractions), bounds, min_size))
}
