/// Lifecycle of one captured image inside the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// No image loaded; the capture source is live.
    #[default]
    Idle,
    /// An image is displayed and can be saved or cropped.
    Preview,
    /// A crop rectangle is being edited.
    Cropping,
}
