use super::model::SessionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoadImage,
    EnterCrop,
    CancelCrop,
    ApplyCrop,
    Save,
    Retake,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<SessionMode>,
    pub event: SessionEvent,
    pub to: SessionMode,
}

impl StateTransition {
    pub const fn new(from: Option<SessionMode>, event: SessionEvent, to: SessionMode) -> Self {
        Self { from, event, to }
    }
}
