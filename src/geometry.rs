//! Coordinate spaces shared by the crop engine.
//!
//! Three spaces are in play: viewport (raw pointer/touch client coordinates),
//! display (relative to the top-left of the rendered image element) and
//! natural (the decoded image's intrinsic pixel grid). Every conversion in the
//! crate goes viewport -> display -> natural through the functions here.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, delta_x: f64, delta_y: f64) -> Self {
        Self::new(self.x + delta_x, self.y + delta_y)
    }
}

/// Width and height of the rendered image box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A size is usable once layout has produced a finite, non-empty box.
    pub fn is_laid_out(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Bounding box of the rendered image element in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayBox {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub const fn size(self) -> DisplaySize {
        DisplaySize::new(self.width, self.height)
    }
}

/// Rectangle with floating point edges, used for both display and natural space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(self) -> f64 {
        self.y + self.height
    }

    pub fn contains(self, point: DisplayPoint) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn translated(self, delta_x: f64, delta_y: f64) -> Self {
        Self::new(self.x + delta_x, self.y + delta_y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NaturalSize {
    pub width: u32,
    pub height: u32,
}

impl NaturalSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Integer pixel region inside a natural-space image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `natural / display` per axis. `None` until the display box has a usable size.
    pub fn between(natural: NaturalSize, display: DisplaySize) -> Option<Self> {
        if !display.is_laid_out() || natural.is_empty() {
            return None;
        }
        Some(Self::new(
            f64::from(natural.width) / display.width,
            f64::from(natural.height) / display.height,
        ))
    }
}

/// Converts raw pointer coordinates to coordinates relative to the image element.
///
/// Always measured against the image element's own box, never a parent container.
pub fn to_display_local(pointer_x: f64, pointer_y: f64, display_box: DisplayBox) -> DisplayPoint {
    DisplayPoint::new(pointer_x - display_box.left, pointer_y - display_box.top)
}

pub fn to_natural_space(rect: CropRect, scale: ScaleFactors) -> CropRect {
    CropRect::new(
        rect.x * scale.x,
        rect.y * scale.y,
        rect.width * scale.x,
        rect.height * scale.y,
    )
}
