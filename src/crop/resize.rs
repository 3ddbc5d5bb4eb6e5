use crate::geometry::{CropRect, DisplayPoint, DisplaySize};

use super::{clamp, effective_floor, usable_extent, Handle};

/// Applies a pointer delta, measured from drag start, to the rectangle captured at drag start.
///
/// The edge opposite the grabbed one stays fixed. Dragging past it flips the
/// rectangle (`abs` length, `min` origin) rather than producing a negative size.
/// `Handle::None` leaves the rectangle unchanged; sweeping a fresh selection
/// is [`sweep_selection`].
pub fn resize_from_handle(
    origin: CropRect,
    handle: Handle,
    delta_x: f64,
    delta_y: f64,
    bounds: DisplaySize,
    min_size: f64,
) -> CropRect {
    match handle {
        Handle::None => origin,
        Handle::Move => clamp(origin.translated(delta_x, delta_y), bounds, min_size),
        _ => {
            let floor_x = effective_floor(min_size, bounds.width);
            let floor_y = effective_floor(min_size, bounds.height);
            let (x, width) = if handle.moves_left_edge() {
                span(
                    origin.right(),
                    clip(origin.x + delta_x, bounds.width),
                    floor_x,
                )
            } else if handle.moves_right_edge() {
                span(
                    origin.x,
                    clip(origin.right() + delta_x, bounds.width),
                    floor_x,
                )
            } else {
                (origin.x, origin.width)
            };
            let (y, height) = if handle.moves_top_edge() {
                span(
                    origin.bottom(),
                    clip(origin.y + delta_y, bounds.height),
                    floor_y,
                )
            } else if handle.moves_bottom_edge() {
                span(
                    origin.y,
                    clip(origin.bottom() + delta_y, bounds.height),
                    floor_y,
                )
            } else {
                (origin.y, origin.height)
            };
            clamp(CropRect::new(x, y, width, height), bounds, min_size)
        }
    }
}

/// Rectangle swept from `anchor` to `pointer`, used when a drag starts outside the selection.
pub fn sweep_selection(
    anchor: DisplayPoint,
    pointer: DisplayPoint,
    bounds: DisplaySize,
    min_size: f64,
) -> CropRect {
    let (x, width) = span(
        clip(anchor.x, bounds.width),
        clip(pointer.x, bounds.width),
        effective_floor(min_size, bounds.width),
    );
    let (y, height) = span(
        clip(anchor.y, bounds.height),
        clip(pointer.y, bounds.height),
        effective_floor(min_size, bounds.height),
    );
    clamp(CropRect::new(x, y, width, height), bounds, min_size)
}

fn clip(value: f64, extent: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, usable_extent(extent))
    } else {
        0.0
    }
}

/// `(start, length)` of the interval between a fixed and a moving coordinate.
///
/// Below the floor the interval is held at `floor`, growing from the fixed
/// coordinate towards the side the moving one is on.
fn span(fixed: f64, moving: f64, floor: f64) -> (f64, f64) {
    let length = (moving - fixed).abs();
    if length >= floor {
        (fixed.min(moving), length)
    } else if moving < fixed {
        (fixed - floor, floor)
    } else {
        (fixed, floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::DEFAULT_MIN_CROP_SIZE;

    const BOUNDS: DisplaySize = DisplaySize::new(400.0, 300.0);
    const ORIGIN: CropRect = CropRect::new(100.0, 100.0, 200.0, 100.0);

    fn resize(handle: Handle, delta_x: f64, delta_y: f64) -> CropRect {
        resize_from_handle(ORIGIN, handle, delta_x, delta_y, BOUNDS, DEFAULT_MIN_CROP_SIZE)
    }

    #[test]
    fn move_translates_without_changing_size() {
        assert_eq!(
            resize(Handle::Move, 20.0, 10.0),
            CropRect::new(120.0, 110.0, 200.0, 100.0)
        );
    }

    #[test]
    fn move_stops_at_bounds_and_keeps_size() {
        assert_eq!(
            resize(Handle::Move, 500.0, -500.0),
            CropRect::new(200.0, 0.0, 200.0, 100.0)
        );
    }

    #[test]
    fn corner_resize_keeps_opposite_corner_fixed() {
        assert_eq!(
            resize(Handle::TopLeft, -30.0, -20.0),
            CropRect::new(70.0, 80.0, 230.0, 120.0)
        );
        assert_eq!(
            resize(Handle::BottomRight, 40.0, 25.0),
            CropRect::new(100.0, 100.0, 240.0, 125.0)
        );
        assert_eq!(
            resize(Handle::TopRight, 10.0, 30.0),
            CropRect::new(100.0, 130.0, 210.0, 70.0)
        );
        assert_eq!(
            resize(Handle::BottomLeft, 50.0, -40.0),
            CropRect::new(150.0, 100.0, 150.0, 60.0)
        );
    }

    #[test]
    fn edge_resize_changes_only_its_dimension() {
        assert_eq!(
            resize(Handle::Top, 80.0, -40.0),
            CropRect::new(100.0, 60.0, 200.0, 140.0)
        );
        assert_eq!(
            resize(Handle::Bottom, 80.0, 40.0),
            CropRect::new(100.0, 100.0, 200.0, 140.0)
        );
        assert_eq!(
            resize(Handle::Left, 50.0, 90.0),
            CropRect::new(150.0, 100.0, 150.0, 100.0)
        );
        assert_eq!(
            resize(Handle::Right, -50.0, 90.0),
            CropRect::new(100.0, 100.0, 150.0, 100.0)
        );
    }

    #[test]
    fn bottom_right_dragged_past_top_left_flips_to_positive_size() {
        // Pointer-derived corner lands at (40, 60), above-left of the fixed (100, 100).
        let flipped = resize(Handle::BottomRight, -260.0, -140.0);
        assert_eq!(flipped, CropRect::new(40.0, 60.0, 60.0, 40.0));
        assert!(flipped.width > 0.0 && flipped.height > 0.0);
    }

    #[test]
    fn shrinking_below_floor_holds_at_floor() {
        let shrunk = resize(Handle::BottomRight, -195.0, -95.0);
        assert_eq!(shrunk, CropRect::new(100.0, 100.0, 30.0, 30.0));

        let shrunk = resize(Handle::TopLeft, 195.0, 95.0);
        assert_eq!(shrunk, CropRect::new(270.0, 170.0, 30.0, 30.0));
    }

    #[test]
    fn resize_clips_pointer_to_bounds() {
        assert_eq!(
            resize(Handle::TopLeft, -500.0, -500.0),
            CropRect::new(0.0, 0.0, 300.0, 200.0)
        );
        assert_eq!(
            resize(Handle::Right, 1000.0, 0.0),
            CropRect::new(100.0, 100.0, 300.0, 100.0)
        );
    }

    #[test]
    fn none_handle_leaves_rectangle_alone() {
        assert_eq!(resize(Handle::None, 20.0, 20.0), ORIGIN);
    }

    #[test]
    fn sweep_selection_normalizes_reverse_drag() {
        assert_eq!(
            sweep_selection(
                DisplayPoint::new(300.0, 250.0),
                DisplayPoint::new(100.0, 50.0),
                BOUNDS,
                DEFAULT_MIN_CROP_SIZE,
            ),
            CropRect::new(100.0, 50.0, 200.0, 200.0)
        );
    }

    #[test]
    fn sweep_selection_clips_and_floors() {
        assert_eq!(
            sweep_selection(
                DisplayPoint::new(390.0, 10.0),
                DisplayPoint::new(900.0, 12.0),
                BOUNDS,
                DEFAULT_MIN_CROP_SIZE,
            ),
            CropRect::new(370.0, 10.0, 30.0, 30.0)
        );
    }
}
