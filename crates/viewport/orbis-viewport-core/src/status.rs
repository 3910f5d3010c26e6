//! Viewport status and its observers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{StateRef, TransitionRef};

/// What the viewport is doing with the camera.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ViewportStatus {
    /// Nothing drives the camera.
    #[default]
    Idle,
    /// A state owns the camera.
    State(StateRef),
    /// A transition is moving the camera towards `to_state`.
    Transition {
        transition: TransitionRef,
        to_state: StateRef,
    },
}

impl ViewportStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// The state reached, or being moved to.
    pub fn target(&self) -> Option<&StateRef> {
        match self {
            Self::Idle => None,
            Self::State(state) => Some(state),
            Self::Transition { to_state, .. } => Some(to_state),
        }
    }
}

impl fmt::Display for ViewportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::State(state) => write!(f, "state({})", state.id()),
            Self::Transition {
                transition,
                to_state,
            } => write!(f, "transition({} -> {})", transition.id(), to_state.id()),
        }
    }
}

/// Why the status changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusChangeReason {
    IdleRequested,
    TransitionStarted,
    TransitionSucceeded,
    TransitionFailed,
    UserInteraction,
}

/// Receives every status change on a later task-queue turn.
pub trait ViewportStatusObserver {
    fn viewport_status_did_change(
        &mut self,
        from: &ViewportStatus,
        to: &ViewportStatus,
        reason: StatusChangeReason,
    );
}

impl<F> ViewportStatusObserver for F
where
    F: FnMut(&ViewportStatus, &ViewportStatus, StatusChangeReason),
{
    fn viewport_status_did_change(
        &mut self,
        from: &ViewportStatus,
        to: &ViewportStatus,
        reason: StatusChangeReason,
    ) {
        self(from, to, reason)
    }
}
