use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geometry::{CropRect, DisplayPoint};

/// Which part of the crop rectangle a gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    Move,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    /// Pointer went down outside the rectangle.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown crop handle: {0}")]
pub struct ParseHandleError(pub String);

impl Handle {
    pub const ALL: [Handle; 10] = [
        Self::Move,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::None,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        }
    }

    pub const fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }

    pub const fn is_edge(self) -> bool {
        matches!(self, Self::Top | Self::Bottom | Self::Left | Self::Right)
    }

    pub const fn moves_left_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft | Self::Left)
    }

    pub const fn moves_right_edge(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight | Self::Right)
    }

    pub const fn moves_top_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::Top)
    }

    pub const fn moves_bottom_edge(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight | Self::Bottom)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handle {
    type Err = ParseHandleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.as_str() == value)
            .ok_or_else(|| ParseHandleError(value.to_string()))
    }
}

/// Hit area of the overlay affordances, in display units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleHitArea {
    pub corner_size: f64,
    pub edge_size: f64,
}

impl Default for HandleHitArea {
    fn default() -> Self {
        Self {
            corner_size: 12.0,
            edge_size: 8.0,
        }
    }
}

/// Centre of each resize affordance, corners first.
pub fn handle_anchor_points(rect: CropRect) -> [(Handle, DisplayPoint); 8] {
    let center_x = rect.x + rect.width / 2.0;
    let center_y = rect.y + rect.height / 2.0;
    [
        (Handle::TopLeft, DisplayPoint::new(rect.x, rect.y)),
        (Handle::TopRight, DisplayPoint::new(rect.right(), rect.y)),
        (Handle::BottomLeft, DisplayPoint::new(rect.x, rect.bottom())),
        (
            Handle::BottomRight,
            DisplayPoint::new(rect.right(), rect.bottom()),
        ),
        (Handle::Top, DisplayPoint::new(center_x, rect.y)),
        (Handle::Bottom, DisplayPoint::new(center_x, rect.bottom())),
        (Handle::Left, DisplayPoint::new(rect.x, center_y)),
        (Handle::Right, DisplayPoint::new(rect.right(), center_y)),
    ]
}

pub fn handle_at_point(rect: CropRect, point: DisplayPoint, hit_area: HandleHitArea) -> Handle {
    for (handle, anchor) in handle_anchor_points(rect) {
        let reach = if handle.is_corner() {
            hit_area.corner_size / 2.0
        } else {
            hit_area.edge_size / 2.0
        };
        if (point.x - anchor.x).abs() <= reach && (point.y - anchor.y).abs() <= reach {
            return handle;
        }
    }
    if rect.contains(point) {
        Handle::Move
    } else {
        Handle::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: CropRect = CropRect::new(50.0, 50.0, 200.0, 100.0);

    #[test]
    fn handle_names_round_trip_through_from_str() {
        for handle in Handle::ALL {
            assert_eq!(handle.as_str().parse::<Handle>(), Ok(handle));
        }
        assert_eq!(
            "middle".parse::<Handle>(),
            Err(ParseHandleError("middle".to_string()))
        );
    }

    #[test]
    fn edge_flags_cover_each_resize_handle_exactly_once_per_axis() {
        for handle in Handle::ALL {
            let horizontal = handle.moves_left_edge() as u8 + handle.moves_right_edge() as u8;
            let vertical = handle.moves_top_edge() as u8 + handle.moves_bottom_edge() as u8;
            assert!(horizontal <= 1, "{handle} moves both horizontal edges");
            assert!(vertical <= 1, "{handle} moves both vertical edges");
            if handle.is_corner() {
                assert_eq!((horizontal, vertical), (1, 1), "{handle}");
            }
            if handle.is_edge() {
                assert_eq!(horizontal + vertical, 1, "{handle}");
            }
        }
    }

    #[test]
    fn handle_at_point_prefers_corners_then_edges_then_body() {
        let hit = HandleHitArea::default();
        assert_eq!(
            handle_at_point(RECT, DisplayPoint::new(54.0, 46.0), hit),
            Handle::TopLeft
        );
        assert_eq!(
            handle_at_point(RECT, DisplayPoint::new(250.0, 150.0), hit),
            Handle::BottomRight
        );
        assert_eq!(
            handle_at_point(RECT, DisplayPoint::new(150.0, 53.0), hit),
            Handle::Top
        );
        assert_eq!(
            handle_at_point(RECT, DisplayPoint::new(247.0, 100.0), hit),
            Handle::Right
        );
        assert_eq!(
            handle_at_point(RECT, DisplayPoint::new(120.0, 80.0), hit),
            Handle::Move
        );
        assert_eq!(
            handle_at_point(RECT, DisplayPoint::new(10.0, 10.0), hit),
            Handle::None
        );
    }
}
