//! Behaviors the controller sequences: states that keep the camera on a
//! target and transitions that move it there.

use std::fmt;
use std::rc::Rc;

use orbis_animation_core::{CameraOptions, Cancelable};

use crate::ids::{StateId, TransitionId};

/// Receives target cameras. Return `false` to stop receiving them.
pub type CameraHandler = Box<dyn FnMut(&CameraOptions) -> bool>;

/// Called once with `true` when the transition reached its state.
pub type TransitionCompletion = Box<dyn FnOnce(bool)>;

/// A camera behavior such as following a moving location or fitting a region.
pub trait ViewportState {
    /// Stream the cameras this state wants. When a camera is already known
    /// the handler runs before this returns.
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable;

    /// Take over the camera until [`stop_updating_camera`](Self::stop_updating_camera).
    fn start_updating_camera(&self);

    fn stop_updating_camera(&self);
}

/// Moves the camera from wherever it is to the cameras of a state.
pub trait ViewportTransition {
    /// Start moving towards `to`. Cancelling the returned token stops the
    /// move; the transition may still report `false` afterwards.
    fn run(&self, to: &StateRef, completion: TransitionCompletion) -> Cancelable;
}

/// A state registered with a controller. Equality is identity.
#[derive(Clone)]
pub struct StateRef {
    id: StateId,
    state: Rc<dyn ViewportState>,
}

impl StateRef {
    pub(crate) fn new(id: StateId, state: Rc<dyn ViewportState>) -> Self {
        Self { id, state }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn state(&self) -> &Rc<dyn ViewportState> {
        &self.state
    }
}

impl PartialEq for StateRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for StateRef {}

impl fmt::Debug for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateRef({})", self.id)
    }
}

/// A transition registered with a controller. Equality is identity.
#[derive(Clone)]
pub struct TransitionRef {
    id: TransitionId,
    transition: Rc<dyn ViewportTransition>,
}

impl TransitionRef {
    pub(crate) fn new(id: TransitionId, transition: Rc<dyn ViewportTransition>) -> Self {
        Self { id, transition }
    }

    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn transition(&self) -> &Rc<dyn ViewportTransition> {
        &self.transition
    }
}

impl PartialEq for TransitionRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TransitionRef {}

impl fmt::Debug for TransitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionRef({})", self.id)
    }
}
