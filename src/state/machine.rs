use super::error::{StateError, StateResult};
use super::{SessionEvent, SessionMode, StateTransition};

#[derive(Debug)]
pub struct StateMachine {
    state: SessionMode,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: SessionMode::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionMode {
        self.state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }

    pub fn can_transition(&self, event: SessionEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: SessionEvent) -> Option<SessionMode> {
        use SessionEvent::*;
        match (self.state, event) {
            (SessionMode::Idle | SessionMode::Preview, LoadImage) => Some(SessionMode::Preview),
            (SessionMode::Preview | SessionMode::Cropping, EnterCrop) => {
                Some(SessionMode::Cropping)
            }
            (SessionMode::Cropping, CancelCrop | ApplyCrop) => Some(SessionMode::Preview),
            (SessionMode::Preview | SessionMode::Cropping, Save | Retake) => {
                Some(SessionMode::Idle)
            }
            (_, Close) => Some(SessionMode::Idle),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: SessionEvent) -> StateResult<SessionMode> {
        tracing::debug!(from = ?self.state, event = ?event, "request session transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid session transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        self.transition_history.push(record);

        Ok(self.state)
    }

    /// Fails without transitioning when `event` is not accepted from the current mode.
    pub fn ensure(&self, event: SessionEvent) -> StateResult<SessionMode> {
        self.next_state(event)
            .ok_or(StateError::InvalidStateTransition {
                from: self.state,
                event,
            })
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionMode::{:?}", self.state)
    }
}
