//! One crop widget session: the public operations a host UI calls.
//!
//! The host loads a captured image, reports when layout has placed it,
//! forwards raw pointer/touch events, and calls the mode operations
//! (`enable_crop_mode`, `cancel_crop`, `apply_crop`, `save`, `retake`,
//! `close`). Everything runs on the caller's thread.

use image::DynamicImage;

use crate::capture::ImageReference;
use crate::config::CropConfig;
use crate::crop::{initial_rectangle, CropError};
use crate::error::{AppError, AppResult};
use crate::geometry::{CropRect, DisplayBox, DisplaySize};
use crate::input::{normalize_event, GestureEvent, RawPointerEvent};
use crate::interaction::{CropInteraction, CropObserver, InteractionState};
use crate::render::{encode_jpeg, render_crop, RenderError};
use crate::state::{SessionEvent, SessionMode, StateMachine, StateTransition};
use crate::storage::{CroppedOutput, OutputConsumer};

/// What asked for a default rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitTrigger {
    ImageDisplayed,
    CropMode,
}

#[derive(Debug)]
pub struct CropSession {
    config: CropConfig,
    machine: StateMachine,
    image: Option<ImageReference>,
    interaction: CropInteraction,
    pending_init: Option<InitTrigger>,
}

impl Default for CropSession {
    fn default() -> Self {
        Self::new(CropConfig::default())
    }
}

impl CropSession {
    pub fn new(config: CropConfig) -> Self {
        let config = config.normalized();
        let interaction = CropInteraction::new(config.min_crop_size, config.hit_area());
        Self {
            config,
            machine: StateMachine::new(),
            image: None,
            interaction,
            pending_init: None,
        }
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.machine.state()
    }

    pub fn history(&self) -> &[StateTransition] {
        self.machine.history()
    }

    pub fn image(&self) -> Option<&ImageReference> {
        self.image.as_ref()
    }

    pub fn crop_rectangle(&self) -> Option<CropRect> {
        self.interaction.rectangle()
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    /// Default rectangle waiting for decoding or layout to finish.
    pub fn pending_initialization(&self) -> Option<InitTrigger> {
        self.pending_init
    }

    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: CropObserver + 'static,
    {
        self.interaction.subscribe(observer);
    }

    /// Displays a newly captured image, replacing any previous one.
    pub fn load_image(&mut self, image: ImageReference) -> AppResult<Option<CropRect>> {
        self.machine.transition(SessionEvent::LoadImage)?;
        tracing::info!(capture_id = image.capture_id(), "captured image loaded");
        self.interaction.end();
        self.image = Some(image);
        self.initialize(InitTrigger::ImageDisplayed)
    }

    /// Completes a load that started with [`ImageReference::pending`].
    pub fn image_decoded(&mut self, decoded: DynamicImage) -> AppResult<Option<CropRect>> {
        self.image
            .as_mut()
            .ok_or(AppError::NoImage)?
            .finish_decoding(decoded);
        self.run_pending_initialization()
    }

    /// Records the image element's box after layout.
    ///
    /// Runs a deferred initialization, or rescales the live rectangle when the
    /// box changed size (rotation, responsive resize).
    pub fn layout_ready(&mut self, display_box: DisplayBox) -> AppResult<Option<CropRect>> {
        let image = self.image.as_mut().ok_or(AppError::NoImage)?;
        let previous = image.display_box().map(DisplayBox::size);
        image.set_display_box(display_box);

        if self.pending_init.is_some() {
            return self.run_pending_initialization();
        }
        let Some(rect) = self.interaction.rectangle() else {
            return Ok(None);
        };
        let bounds = display_box.size();
        if previous == Some(bounds) || !bounds.is_laid_out() {
            return Ok(None);
        }
        let rescaled = previous
            .filter(|previous| previous.is_laid_out())
            .map_or(rect, |previous| rescale(rect, previous, bounds));
        Ok(Some(self.interaction.begin(rescaled, bounds)))
    }

    pub fn enable_crop_mode(&mut self) -> AppResult<Option<CropRect>> {
        self.machine.transition(SessionEvent::EnterCrop)?;
        self.interaction.end();
        self.initialize(InitTrigger::CropMode)
    }

    pub fn cancel_crop(&mut self) -> AppResult<()> {
        self.machine.transition(SessionEvent::CancelCrop)?;
        self.pending_init = None;
        self.interaction.end();
        Ok(())
    }

    /// Routes a raw host event; returns the rectangle when it changed.
    pub fn handle_pointer(&mut self, event: &RawPointerEvent) -> Option<CropRect> {
        let display_box = self.image.as_ref()?.display_box()?;
        let gesture = normalize_event(event, display_box)?;
        self.handle_gesture(gesture)
    }

    /// Routes an already display-local gesture.
    pub fn handle_gesture(&mut self, gesture: GestureEvent) -> Option<CropRect> {
        if self.mode() != SessionMode::Cropping {
            return None;
        }
        self.interaction.handle_event(gesture)
    }

    /// Sets the rectangle directly while cropping; it is clamped like any gesture.
    pub fn set_crop_rectangle(&mut self, rect: CropRect) -> Option<CropRect> {
        if self.mode() != SessionMode::Cropping {
            return None;
        }
        self.interaction.replace_rectangle(rect)
    }

    /// Crops the displayed image to the committed rectangle.
    ///
    /// On success the cropped result becomes the displayed image (awaiting
    /// layout) and the session returns to preview. Failures leave the session
    /// in crop mode so the host can retry.
    pub fn apply_crop(&mut self) -> AppResult<CroppedOutput> {
        self.machine.ensure(SessionEvent::ApplyCrop)?;
        let image = self.image.as_ref().ok_or(AppError::NoImage)?;
        let rect = self
            .interaction
            .rectangle()
            .ok_or(RenderError::ImageNotReady)?;

        let cropped = render_crop(image, rect).inspect_err(|err| {
            tracing::warn!(%err, ?rect, "crop render failed");
        })?;
        let bytes = encode_jpeg(&cropped.pixels, self.config.jpeg_quality)?;
        let output = CroppedOutput::jpeg(
            &self.config.output_prefix,
            cropped.region.width,
            cropped.region.height,
            bytes,
        );
        let capture_id = image.capture_id().to_string();

        self.machine.transition(SessionEvent::ApplyCrop)?;
        self.interaction.end();
        self.image = Some(ImageReference::from_image(
            capture_id,
            DynamicImage::ImageRgba8(cropped.pixels),
        ));
        self.initialize(InitTrigger::ImageDisplayed)?;
        Ok(output)
    }

    /// Hands the final image to `consumer` and ends the session.
    ///
    /// While cropping, the crop is applied first.
    pub fn save(&mut self, consumer: &mut dyn OutputConsumer) -> AppResult<CroppedOutput> {
        self.machine.ensure(SessionEvent::Save)?;
        let output = if self.mode() == SessionMode::Cropping {
            self.apply_crop()?
        } else {
            self.encode_displayed()?
        };
        consumer.consume(&output)?;
        self.machine.transition(SessionEvent::Save)?;
        self.clear();
        Ok(output)
    }

    pub fn retake(&mut self) -> AppResult<()> {
        self.machine.transition(SessionEvent::Retake)?;
        self.clear();
        Ok(())
    }

    pub fn close(&mut self) -> AppResult<()> {
        self.machine.transition(SessionEvent::Close)?;
        self.clear();
        Ok(())
    }

    fn encode_displayed(&self) -> AppResult<CroppedOutput> {
        let image = self.image.as_ref().ok_or(AppError::NoImage)?;
        let pixels = image
            .pixels()
            .filter(|_| image.is_ready())
            .ok_or(RenderError::ImageNotReady)?;
        let bytes = encode_jpeg(pixels, self.config.jpeg_quality)?;
        Ok(CroppedOutput::jpeg(
            &self.config.output_prefix,
            pixels.width(),
            pixels.height(),
            bytes,
        ))
    }

    fn run_pending_initialization(&mut self) -> AppResult<Option<CropRect>> {
        match self.pending_init {
            Some(trigger) => self.initialize(trigger),
            None => Ok(None),
        }
    }

    fn initialize(&mut self, trigger: InitTrigger) -> AppResult<Option<CropRect>> {
        let fractions = match trigger {
            InitTrigger::ImageDisplayed => self.config.capture_fractions,
            InitTrigger::CropMode => self.config.crop_mode_fractions,
        };
        let bounds = self
            .image
            .as_ref()
            .filter(|image| image.is_ready())
            .and_then(ImageReference::display_box)
            .map(DisplayBox::size);

        match (
            initial_rectangle(bounds, fractions, self.config.min_crop_size),
            bounds,
        ) {
            (Ok(rect), Some(bounds)) => {
                self.pending_init = None;
                Ok(Some(self.interaction.begin(rect, bounds)))
            }
            (Err(CropError::BoundsUnknown), _) | (Ok(_), None) => {
                tracing::debug!(?trigger, "display bounds unknown; deferring default crop");
                self.pending_init = Some(trigger);
                Ok(None)
            }
        }
    }

    fn clear(&mut self) {
        self.image = None;
        self.pending_init = None;
        self.interaction.end();
    }
}

fn rescale(rect: CropRect, from: DisplaySize, to: DisplaySize) -> CropRect {
    let scale_x = to.width / from.width;
    let scale_y = to.height / from.height;
    CropRect::new(
        rect.x * scale_x,
        rect.y * scale_y,
        rect.width * scale_x,
        rect.height * scale_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::Handle;
    use crate::input::{PointerPhase, TouchPoint};
    use crate::storage::MemoryOutput;
    use image::{Rgba, RgbaImage};

    const IMAGE_BOX: DisplayBox = DisplayBox::new(10.0, 20.0, 400.0, 300.0);

    fn captured(width: u32, height: u32) -> ImageReference {
        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        });
        ImageReference::from_image("capture-test", DynamicImage::ImageRgba8(pixels))
    }

    fn cropping_session() -> CropSession {
        let mut session = CropSession::default();
        session
            .load_image(captured(800, 600))
            .expect("load should work");
        session
            .layout_ready(IMAGE_BOX)
            .expect("layout should work");
        session
            .enable_crop_mode()
            .expect("enter crop should work");
        session
    }

    #[test]
    fn load_defers_default_rectangle_until_layout() {
        let mut session = CropSession::default();
        let rect = session
            .load_image(captured(800, 600))
            .expect("load should work");
        assert_eq!(rect, None);
        assert_eq!(
            session.pending_initialization(),
            Some(InitTrigger::ImageDisplayed)
        );

        let rect = session
            .layout_ready(IMAGE_BOX)
            .expect("layout should work")
            .expect("deferred rectangle should be produced");
        assert_eq!(rect, CropRect::new(30.0, 75.0, 340.0, 150.0));
        assert_eq!(session.pending_initialization(), None);
    }

    #[test]
    fn pending_decode_defers_until_pixels_arrive() {
        let mut session = CropSession::default();
        session
            .load_image(ImageReference::pending("capture-slow"))
            .expect("load should work");
        assert_eq!(
            session.layout_ready(IMAGE_BOX).expect("layout should work"),
            None
        );
        let rect = session
            .image_decoded(DynamicImage::new_rgba8(800, 600))
            .expect("decode should work");
        assert_eq!(rect, Some(CropRect::new(30.0, 75.0, 340.0, 150.0)));
    }

    #[test]
    fn enable_crop_mode_uses_crop_mode_fractions() {
        let session = cropping_session();
        assert_eq!(session.mode(), SessionMode::Cropping);
        assert_eq!(
            session.crop_rectangle(),
            Some(CropRect::new(40.0, 60.0, 320.0, 180.0))
        );
    }

    #[test]
    fn pointer_events_drive_rectangle_only_while_cropping() {
        let mut session = CropSession::default();
        session
            .load_image(captured(800, 600))
            .expect("load should work");
        session
            .layout_ready(IMAGE_BOX)
            .expect("layout should work");
        let before = session.crop_rectangle();
        session.handle_pointer(&RawPointerEvent::mouse(PointerPhase::Down, 200.0, 200.0));
        assert_eq!(
            session.handle_pointer(&RawPointerEvent::mouse(PointerPhase::Move, 220.0, 210.0)),
            None
        );
        assert_eq!(session.crop_rectangle(), before);
    }

    #[test]
    fn touch_drag_moves_rectangle() {
        let mut session = cropping_session();
        session.handle_pointer(&RawPointerEvent::touch(
            PointerPhase::Down,
            vec![TouchPoint::new(1, 210.0, 170.0)],
        ));
        let rect = session
            .handle_pointer(&RawPointerEvent::touch(
                PointerPhase::Move,
                vec![TouchPoint::new(1, 230.0, 180.0)],
            ))
            .expect("touch move should change rectangle");
        assert_eq!(rect, CropRect::new(60.0, 70.0, 320.0, 180.0));
        session.handle_pointer(&RawPointerEvent::touch(PointerPhase::Up, Vec::new()));
        assert_eq!(session.interaction_state(), InteractionState::Idle);
    }

    #[test]
    fn second_pointer_release_keeps_first_drag() {
        let mut session = cropping_session();
        session.handle_pointer(&RawPointerEvent::pointer(PointerPhase::Down, 1, 210.0, 170.0));
        session.handle_pointer(&RawPointerEvent::pointer(PointerPhase::Down, 2, 20.0, 30.0));
        session.handle_pointer(&RawPointerEvent::pointer(PointerPhase::Up, 2, 20.0, 30.0));
        assert_eq!(
            session.interaction_state(),
            InteractionState::Dragging(Handle::Move)
        );

        let rect = session
            .handle_pointer(&RawPointerEvent::pointer(PointerPhase::Move, 1, 230.0, 180.0))
            .expect("first pointer should keep dragging");
        assert_eq!(rect, CropRect::new(60.0, 70.0, 320.0, 180.0));
    }

    #[test]
    fn lifting_second_finger_keeps_first_finger_drag() {
        let mut session = cropping_session();
        session.handle_pointer(&RawPointerEvent::touch(
            PointerPhase::Down,
            vec![TouchPoint::new(1, 210.0, 170.0)],
        ));
        session.handle_pointer(&RawPointerEvent::touch(
            PointerPhase::Down,
            vec![
                TouchPoint::new(1, 210.0, 170.0),
                TouchPoint::new(2, 20.0, 30.0),
            ],
        ));
        session.handle_pointer(&RawPointerEvent::touch(
            PointerPhase::Up,
            vec![TouchPoint::new(1, 210.0, 170.0)],
        ));
        assert_eq!(
            session.interaction_state(),
            InteractionState::Dragging(Handle::Move)
        );

        let rect = session
            .handle_pointer(&RawPointerEvent::touch(
                PointerPhase::Move,
                vec![TouchPoint::new(1, 230.0, 180.0)],
            ))
            .expect("first finger should keep dragging");
        assert_eq!(rect, CropRect::new(60.0, 70.0, 320.0, 180.0));
    }

    #[test]
    fn handle_target_from_host_resizes() {
        let mut session = cropping_session();
        session.handle_pointer(
            &RawPointerEvent::pointer(PointerPhase::Down, 4, 370.0, 260.0)
                .with_target(Handle::BottomRight),
        );
        let rect = session
            .handle_pointer(&RawPointerEvent::pointer(
                PointerPhase::Move,
                4,
                390.0,
                280.0,
            ))
            .expect("resize should change rectangle");
        assert_eq!(rect, CropRect::new(40.0, 60.0, 340.0, 200.0));
    }

    #[test]
    fn apply_crop_outputs_native_pixels_and_returns_to_preview() {
        let mut session = cropping_session();
        session.set_crop_rectangle(CropRect::new(50.0, 50.0, 200.0, 150.0));

        let output = session.apply_crop().expect("apply should work");
        assert_eq!((output.width, output.height), (400, 300));
        assert!(output.file_name.starts_with("id_card_"));
        assert_eq!(session.mode(), SessionMode::Preview);
        assert_eq!(session.crop_rectangle(), None);
        assert_eq!(
            session.image().and_then(ImageReference::natural_size),
            Some(crate::geometry::NaturalSize::new(400, 300))
        );
        assert_eq!(
            session.pending_initialization(),
            Some(InitTrigger::ImageDisplayed)
        );
    }

    #[test]
    fn apply_crop_before_layout_is_image_not_ready_and_keeps_mode() {
        let mut session = CropSession::default();
        session
            .load_image(captured(800, 600))
            .expect("load should work");
        session
            .enable_crop_mode()
            .expect("enter crop should work");
        let err = session.apply_crop().expect_err("apply needs layout");
        assert!(matches!(err, AppError::Render(RenderError::ImageNotReady)));
        assert_eq!(session.mode(), SessionMode::Cropping);
        assert_eq!(session.pending_initialization(), Some(InitTrigger::CropMode));
    }

    #[test]
    fn cancel_crop_discards_rectangle() {
        let mut session = cropping_session();
        session.cancel_crop().expect("cancel should work");
        assert_eq!(session.mode(), SessionMode::Preview);
        assert_eq!(session.crop_rectangle(), None);
        assert!(session.apply_crop().is_err());
    }

    #[test]
    fn save_while_cropping_applies_crop_and_ends_session() {
        let mut session = cropping_session();
        let mut consumer = MemoryOutput::default();
        let output = session.save(&mut consumer).expect("save should work");
        assert_eq!((output.width, output.height), (640, 360));
        assert_eq!(consumer.outputs, vec![output]);
        assert_eq!(session.mode(), SessionMode::Idle);
        assert!(session.image().is_none());
    }

    #[test]
    fn save_from_preview_hands_over_whole_image() {
        let mut session = CropSession::default();
        session
            .load_image(captured(80, 60))
            .expect("load should work");
        let mut consumer = MemoryOutput::default();
        let output = session.save(&mut consumer).expect("save should work");
        assert_eq!((output.width, output.height), (80, 60));
        assert_eq!(output.mime_type, "image/jpeg");
    }

    #[test]
    fn layout_change_rescales_live_rectangle() {
        let mut session = cropping_session();
        let rect = session
            .layout_ready(DisplayBox::new(0.0, 0.0, 200.0, 150.0))
            .expect("layout should work");
        assert_eq!(rect, Some(CropRect::new(20.0, 30.0, 160.0, 90.0)));
    }

    #[test]
    fn retake_and_close_clear_the_session() {
        let mut session = cropping_session();
        session.retake().expect("retake should work");
        assert_eq!(session.mode(), SessionMode::Idle);
        assert!(session.image().is_none());
        assert!(session.retake().is_err());
        session.close().expect("close is always accepted");
    }
}
