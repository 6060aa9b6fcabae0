//! Pipeline state machine
//!
//! Linear: each generation state is entered once, in order, and any
//! non-terminal state may fail. Nothing is ever re-entered.

use crate::error::StageId;
use serde::{Deserialize, Serialize};

/// Where a run is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineState {
    Pending,
    Planning,
    SharedGen,
    ModelGen,
    ServiceGen,
    RouteGen,
    Assembled,
    Failed,
}

impl PipelineState {
    /// State a generation stage runs in
    #[must_use]
    pub fn for_stage(stage: StageId) -> Option<Self> {
        match stage {
            StageId::Input => None,
            StageId::Planner => Some(Self::Planning),
            StageId::Shared => Some(Self::SharedGen),
            StageId::Models => Some(Self::ModelGen),
            StageId::Services => Some(Self::ServiceGen),
            StageId::Routes => Some(Self::RouteGen),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Assembled | Self::Failed)
    }

    /// Move to `next` if the transition is legal
    ///
    /// # Errors
    /// [`TransitionError`] for anything but the single forward step or a
    /// failure from a non-terminal state.
    pub fn advance(&mut self, next: Self) -> Result<(), TransitionError> {
        validate_transition(*self, next)?;
        *self = next;
        Ok(())
    }
}

/// Attempted illegal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal pipeline transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: PipelineState,
    pub to: PipelineState,
}

/// Check a single transition
///
/// # Errors
/// [`TransitionError`] if `to` is not in [`allowed_transitions`] of `from`.
pub fn validate_transition(from: PipelineState, to: PipelineState) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Legal successors of a state
#[must_use]
pub fn allowed_transitions(from: PipelineState) -> Vec<PipelineState> {
    use PipelineState::{
        Assembled, Failed, ModelGen, Pending, Planning, RouteGen, ServiceGen, SharedGen,
    };
    match from {
        Pending => vec![Planning, Failed],
        Planning => vec![SharedGen, Failed],
        SharedGen => vec![ModelGen, Failed],
        ModelGen => vec![ServiceGen, Failed],
        ServiceGen => vec![RouteGen, Failed],
        RouteGen => vec![Assembled, Failed],
        Assembled | Failed => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn happy_path_is_linear() {
        let mut state = Pending;
        for next in [Planning, SharedGen, ModelGen, ServiceGen, RouteGen, Assembled] {
            state.advance(next).unwrap();
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let mut state = Planning;
        let err = state.advance(ModelGen).unwrap_err();
        assert_eq!(err, TransitionError { from: Planning, to: ModelGen });
        assert_eq!(state, Planning);
    }

    #[test]
    fn no_reentry() {
        assert!(validate_transition(ModelGen, ModelGen).is_err());
        assert!(validate_transition(ServiceGen, ModelGen).is_err());
        assert!(allowed_transitions(Assembled).is_empty());
        assert!(allowed_transitions(Failed).is_empty());
    }

    #[test]
    fn any_running_state_may_fail() {
        for state in [Pending, Planning, SharedGen, ModelGen, ServiceGen, RouteGen] {
            assert!(validate_transition(state, Failed).is_ok());
        }
    }

    #[test]
    fn stage_states() {
        assert_eq!(PipelineState::for_stage(StageId::Models), Some(ModelGen));
        assert_eq!(PipelineState::for_stage(StageId::Input), None);
    }
}
