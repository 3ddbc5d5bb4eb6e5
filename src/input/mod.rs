//! Normalizes mouse, pointer and touch input into one gesture stream.
//!
//! Hosts forward raw events with viewport (client) coordinates; this module
//! makes them display-local against the image element's current box and
//! collapses touch input to its first active point.

use crate::crop::Handle;
use crate::geometry::{to_display_local, DisplayBox, DisplayPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    /// The pointer left the image element.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub identifier: i64,
    pub client_x: f64,
    pub client_y: f64,
}

impl TouchPoint {
    pub const fn new(identifier: i64, client_x: f64, client_y: f64) -> Self {
        Self {
            identifier,
            client_x,
            client_y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerSource {
    Mouse {
        client_x: f64,
        client_y: f64,
    },
    Pointer {
        pointer_id: i32,
        client_x: f64,
        client_y: f64,
    },
    /// Touch points on the surface in the order the host reports them. For
    /// `Up` and `Cancel` these are the points still down after the change.
    Touch { touches: Vec<TouchPoint> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Pointer(i32),
    Touch(i64),
}

/// Which pointer a release or cancel came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    Mouse,
    Pointer(i32),
    /// Identifiers of the touch points still down.
    Touch { remaining: Vec<i64> },
}

impl Release {
    /// Whether this event lifts `pointer`; releases from other pointers leave it down.
    pub fn releases(&self, pointer: PointerId) -> bool {
        match (self, pointer) {
            (Self::Mouse, PointerId::Mouse) => true,
            (Self::Pointer(id), PointerId::Pointer(active)) => *id == active,
            (Self::Touch { remaining }, PointerId::Touch(active)) => !remaining.contains(&active),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPointerEvent {
    pub phase: PointerPhase,
    pub source: PointerSource,
    /// Handle affordance the host resolved the press to, if any.
    pub target: Option<Handle>,
}

impl RawPointerEvent {
    pub fn mouse(phase: PointerPhase, client_x: f64, client_y: f64) -> Self {
        Self {
            phase,
            source: PointerSource::Mouse { client_x, client_y },
            target: None,
        }
    }

    pub fn pointer(phase: PointerPhase, pointer_id: i32, client_x: f64, client_y: f64) -> Self {
        Self {
            phase,
            source: PointerSource::Pointer {
                pointer_id,
                client_x,
                client_y,
            },
            target: None,
        }
    }

    pub fn touch(phase: PointerPhase, touches: Vec<TouchPoint>) -> Self {
        Self {
            phase,
            source: PointerSource::Touch { touches },
            target: None,
        }
    }

    pub fn with_target(mut self, handle: Handle) -> Self {
        self.target = Some(handle);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Down {
        pointer: PointerId,
        point: DisplayPoint,
        target: Option<Handle>,
    },
    Move {
        pointer: PointerId,
        point: DisplayPoint,
    },
    Up(Release),
    Cancel(Release),
    /// The pointer left the image element; ends any drag.
    Leave,
}

fn release_of(source: &PointerSource) -> Release {
    match source {
        PointerSource::Mouse { .. } => Release::Mouse,
        PointerSource::Pointer { pointer_id, .. } => Release::Pointer(*pointer_id),
        PointerSource::Touch { touches } => Release::Touch {
            remaining: touches.iter().map(|touch| touch.identifier).collect(),
        },
    }
}

fn primary_position(source: &PointerSource) -> Option<(PointerId, f64, f64)> {
    match source {
        PointerSource::Mouse { client_x, client_y } => {
            Some((PointerId::Mouse, *client_x, *client_y))
        }
        PointerSource::Pointer {
            pointer_id,
            client_x,
            client_y,
        } => Some((PointerId::Pointer(*pointer_id), *client_x, *client_y)),
        PointerSource::Touch { touches } => touches
            .first()
            .map(|touch| (PointerId::Touch(touch.identifier), touch.client_x, touch.client_y)),
    }
}

/// Resolves a raw event against the image element's box.
///
/// Returns `None` for press/move events that carry no usable position (an
/// empty touch list or non-finite coordinates).
pub fn normalize_event(event: &RawPointerEvent, display_box: DisplayBox) -> Option<GestureEvent> {
    match event.phase {
        PointerPhase::Up => Some(GestureEvent::Up(release_of(&event.source))),
        PointerPhase::Cancel => Some(GestureEvent::Cancel(release_of(&event.source))),
        PointerPhase::Leave => Some(GestureEvent::Leave),
        PointerPhase::Down | PointerPhase::Move => {
            let (pointer, client_x, client_y) = primary_position(&event.source)?;
            if !client_x.is_finite() || !client_y.is_finite() {
                tracing::debug!(?pointer, "dropping pointer event with non-finite coordinates");
                return None;
            }
            let point = to_display_local(client_x, client_y, display_box);
            if event.phase == PointerPhase::Down {
                Some(GestureEvent::Down {
                    pointer,
                    point,
                    target: event.target,
                })
            } else {
                Some(GestureEvent::Move { pointer, point })
            }
        }
    }
}
