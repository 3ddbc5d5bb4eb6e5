//! Gesture state machine driving the crop rectangle.

use std::fmt;

use crate::crop::{
    clamp, handle_at_point, resize_from_handle, sweep_selection, Handle, HandleHitArea,
};
use crate::geometry::{CropRect, DisplayPoint, DisplaySize};
use crate::input::{GestureEvent, PointerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging(Handle),
}

/// Receives every rectangle the interaction settles on, in order.
pub trait CropObserver {
    fn crop_changed(&mut self, rect: CropRect);
}

impl<F> CropObserver for F
where
    F: FnMut(CropRect),
{
    fn crop_changed(&mut self, rect: CropRect) {
        self(rect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    pointer: PointerId,
    handle: Handle,
    anchor: DisplayPoint,
    origin: CropRect,
}

pub struct CropInteraction {
    bounds: DisplaySize,
    min_size: f64,
    hit_area: HandleHitArea,
    rect: Option<CropRect>,
    drag: Option<DragSession>,
    observers: Vec<Box<dyn CropObserver>>,
}

impl fmt::Debug for CropInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropInteraction")
            .field("bounds", &self.bounds)
            .field("min_size", &self.min_size)
            .field("rect", &self.rect)
            .field("drag", &self.drag)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CropInteraction {
    pub fn new(min_size: f64, hit_area: HandleHitArea) -> Self {
        Self {
            bounds: DisplaySize::new(0.0, 0.0),
            min_size,
            hit_area,
            rect: None,
            drag: None,
            observers: Vec::new(),
        }
    }

    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: CropObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> InteractionState {
        match self.drag {
            Some(drag) => InteractionState::Dragging(drag.handle),
            None => InteractionState::Idle,
        }
    }

    pub fn rectangle(&self) -> Option<CropRect> {
        self.rect
    }

    pub fn bounds(&self) -> DisplaySize {
        self.bounds
    }

    /// Starts editing `rect` inside `bounds`, dropping any gesture in flight.
    pub fn begin(&mut self, rect: CropRect, bounds: DisplaySize) -> CropRect {
        self.bounds = bounds;
        self.drag = None;
        let rect = clamp(rect, bounds, self.min_size);
        tracing::debug!(?rect, ?bounds, "crop rectangle initialized");
        self.commit(rect);
        rect
    }

    /// Discards the rectangle and any gesture in flight.
    pub fn end(&mut self) -> Option<CropRect> {
        self.drag = None;
        self.rect.take()
    }

    /// Replaces the rectangle outside of a gesture, e.g. from keyboard or host code.
    pub fn replace_rectangle(&mut self, rect: CropRect) -> Option<CropRect> {
        self.rect?;
        let rect = clamp(rect, self.bounds, self.min_size);
        self.commit(rect);
        Some(rect)
    }

    /// Feeds one normalized gesture event; returns the new rectangle when it changed.
    pub fn handle_event(&mut self, event: GestureEvent) -> Option<CropRect> {
        match &event {
            GestureEvent::Down {
                pointer,
                point,
                target,
            } => {
                self.press(*pointer, *point, *target);
                None
            }
            GestureEvent::Move { pointer, point } => self.drag_to(*pointer, *point),
            GestureEvent::Up(release) | GestureEvent::Cancel(release) => {
                match self.drag {
                    Some(drag) if release.releases(drag.pointer) => self.finish_drag(&event),
                    Some(drag) => tracing::debug!(
                        active_pointer = ?drag.pointer,
                        ?release,
                        "ignoring release from another pointer"
                    ),
                    None => {}
                }
                None
            }
            GestureEvent::Leave => {
                self.finish_drag(&event);
                None
            }
        }
    }

    fn finish_drag(&mut self, event: &GestureEvent) {
        if let Some(drag) = self.drag.take() {
            tracing::debug!(
                handle = %drag.handle,
                rect = ?self.rect,
                ?event,
                "crop drag finished"
            );
        }
    }

    fn press(&mut self, pointer: PointerId, point: DisplayPoint, target: Option<Handle>) {
        if let Some(active) = self.drag {
            tracing::debug!(
                active_pointer = ?active.pointer,
                ?pointer,
                "ignoring press while a drag is active"
            );
            return;
        }
        let Some(rect) = self.rect else {
            return;
        };
        let handle = target.unwrap_or_else(|| handle_at_point(rect, point, self.hit_area));
        tracing::debug!(%handle, ?point, "crop drag started");
        self.drag = Some(DragSession {
            pointer,
            handle,
            anchor: point,
            origin: rect,
        });
    }

    fn drag_to(&mut self, pointer: PointerId, point: DisplayPoint) -> Option<CropRect> {
        let drag = self.drag.filter(|drag| drag.pointer == pointer)?;
        let next = match drag.handle {
            Handle::None => sweep_selection(drag.anchor, point, self.bounds, self.min_size),
            handle => resize_from_handle(
                drag.origin,
                handle,
                point.x - drag.anchor.x,
                point.y - drag.anchor.y,
                self.bounds,
                self.min_size,
            ),
        };
        if self.rect == Some(next) {
            return None;
        }
        self.commit(next);
        Some(next)
    }

    fn commit(&mut self, rect: CropRect) {
        self.rect = Some(rect);
        for observer in &mut self.observers {
            observer.crop_changed(rect);
        }
    }
}
