//! Viewport controller: sequences states and the transitions between them.
//!
//! Status changes happen synchronously. Observers hear about them on a later
//! turn of the [`TaskQueue`], so an observer may call back into the
//! controller without re-entering it mid-update.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::debug;
use orbis_animation_core::{CameraAnimations, Cancelable, TaskQueue};

use crate::config::{ViewportConfig, ViewportOptions};
use crate::error::ViewportError;
use crate::ids::{StateId, TransitionId};
use crate::state::{
    StateRef, TransitionCompletion, TransitionRef, ViewportState, ViewportTransition,
};
use crate::status::{StatusChangeReason, ViewportStatus, ViewportStatusObserver};
use crate::transitions::default::DefaultTransition;

/// Observer registration; the controller keeps it alive until removed.
pub type SharedObserver = Rc<RefCell<dyn ViewportStatusObserver>>;

type CompletionSlot = Rc<RefCell<Option<TransitionCompletion>>>;

struct ControllerInner {
    status: ViewportStatus,
    options: ViewportOptions,
    default_transition: TransitionRef,
    observers: Vec<SharedObserver>,
    /// Stops whatever drives the camera: the running state or the transition.
    current: Option<Cancelable>,
    /// Bumped on every start, finish and interruption; stale transition
    /// callbacks compare against it and bail out.
    generation: u64,
    queue: TaskQueue,
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.cancel();
        }
    }
}

/// Shared handle; clones drive the same controller.
#[derive(Clone)]
pub struct ViewportController {
    inner: Rc<RefCell<ControllerInner>>,
}

impl std::fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ViewportController")
            .field("status", &inner.status)
            .field("options", &inner.options)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

impl ViewportController {
    /// Controller in `Idle`. Notifications are posted to `queue`, which the
    /// host drains once per turn (see
    /// [`CameraAnimations::tick`](orbis_animation_core::CameraAnimations::tick)).
    pub fn new(
        options: ViewportOptions,
        queue: TaskQueue,
        default_transition: Rc<dyn ViewportTransition>,
    ) -> Self {
        let default_transition = TransitionRef::new(TransitionId::next(), default_transition);
        Self {
            inner: Rc::new(RefCell::new(ControllerInner {
                status: ViewportStatus::Idle,
                options,
                default_transition,
                observers: Vec::new(),
                current: None,
                generation: 0,
                queue,
            })),
        }
    }

    /// Controller wired to `camera`'s runner: notifications go through the
    /// runner's task queue and the default transition is a
    /// [`DefaultTransition`] animating with `config.animation`.
    pub fn from_config(
        camera: &CameraAnimations,
        config: &ViewportConfig,
    ) -> Result<Self, ViewportError> {
        config.validate()?;
        let camera = CameraAnimations::new(camera.runner().clone(), config.animation.clone());
        let default = DefaultTransition::new(camera.clone(), config.default_transition)?;
        Ok(Self::new(config.viewport, camera.runner().queue(), Rc::new(default)))
    }

    pub fn status(&self) -> ViewportStatus {
        self.inner.borrow().status.clone()
    }

    pub fn options(&self) -> ViewportOptions {
        self.inner.borrow().options
    }

    pub fn set_options(&self, options: ViewportOptions) {
        self.inner.borrow_mut().options = options;
    }

    /// Register a state; each call yields a distinct identity.
    pub fn make_state<S: ViewportState + 'static>(&self, state: Rc<S>) -> StateRef {
        StateRef::new(StateId::next(), state)
    }

    /// Register a transition; each call yields a distinct identity.
    pub fn make_transition<T: ViewportTransition + 'static>(
        &self,
        transition: Rc<T>,
    ) -> TransitionRef {
        TransitionRef::new(TransitionId::next(), transition)
    }

    pub fn default_transition(&self) -> TransitionRef {
        self.inner.borrow().default_transition.clone()
    }

    /// Used by [`transition`](Self::transition) when no transition is given.
    pub fn set_default_transition(&self, transition: TransitionRef) {
        self.inner.borrow_mut().default_transition = transition;
    }

    pub fn add_status_observer(&self, observer: SharedObserver) {
        let mut inner = self.inner.borrow_mut();
        if !inner.observers.iter().any(|o| same_observer(o, &observer)) {
            inner.observers.push(observer);
        }
    }

    pub fn remove_status_observer(&self, observer: &SharedObserver) {
        self.inner
            .borrow_mut()
            .observers
            .retain(|o| !same_observer(o, observer));
    }

    /// Stop whatever drives the camera and go `Idle`.
    pub fn idle(&self) {
        self.idle_with(StatusChangeReason::IdleRequested);
    }

    /// Gesture hook: idles the viewport when the options ask for it.
    pub fn handle_user_interaction(&self) {
        if self.options().transitions_to_idle_upon_user_interaction {
            self.idle_with(StatusChangeReason::UserInteraction);
        }
    }

    /// Move to `to` using `transition`, or the default transition.
    ///
    /// Already in `to`: `completion(true)` runs before this returns. Already
    /// moving to `to`: `completion(false)` runs before this returns and the
    /// move in flight continues. Otherwise the active state or transition is
    /// interrupted and the new transition starts.
    pub fn transition(
        &self,
        to: &StateRef,
        transition: Option<&TransitionRef>,
        completion: impl FnOnce(bool) + 'static,
    ) {
        let settled = match &self.inner.borrow().status {
            ViewportStatus::State(state) if state == to => Some(true),
            ViewportStatus::Transition { to_state, .. } if to_state == to => Some(false),
            _ => None,
        };
        if let Some(success) = settled {
            completion(success);
            return;
        }
        self.start_transition(to, transition, Box::new(completion));
    }

    fn start_transition(
        &self,
        to: &StateRef,
        transition: Option<&TransitionRef>,
        completion: TransitionCompletion,
    ) {
        self.interrupt();

        let transition = match transition {
            Some(t) => t.clone(),
            None => self.default_transition(),
        };
        let generation = self.bump_generation();
        let slot: CompletionSlot = Rc::new(RefCell::new(Some(completion)));

        self.set_status(
            ViewportStatus::Transition {
                transition: transition.clone(),
                to_state: to.clone(),
            },
            StatusChangeReason::TransitionStarted,
        );

        let weak = Rc::downgrade(&self.inner);
        let to_state = to.clone();
        let finish_slot = slot.clone();
        let on_done: TransitionCompletion = Box::new(move |success| {
            if let Some(inner) = weak.upgrade() {
                ViewportController { inner }.finish_transition(
                    generation,
                    &to_state,
                    success,
                    &finish_slot,
                );
            }
        });
        let mut running = transition.transition().run(to, on_done);

        // The transition may have finished, or been replaced, inside `run`.
        if self.inner.borrow().generation != generation {
            return;
        }
        let cancel = Cancelable::new(move || {
            running.cancel();
            let completion = slot.borrow_mut().take();
            if let Some(completion) = completion {
                completion(false);
            }
        });
        self.inner.borrow_mut().current = Some(cancel);
    }

    fn finish_transition(
        &self,
        generation: u64,
        to: &StateRef,
        success: bool,
        slot: &CompletionSlot,
    ) {
        if self.inner.borrow().generation != generation {
            debug!("ignoring stale completion of transition to {}", to.id());
            return;
        }
        self.bump_generation();

        let next = if success {
            let state = to.state().clone();
            state.start_updating_camera();
            Some(Cancelable::new(move || state.stop_updating_camera()))
        } else {
            None
        };
        let previous = std::mem::replace(&mut self.inner.borrow_mut().current, next);
        drop(previous);

        if success {
            self.set_status(
                ViewportStatus::State(to.clone()),
                StatusChangeReason::TransitionSucceeded,
            );
        } else {
            self.set_status(ViewportStatus::Idle, StatusChangeReason::TransitionFailed);
        }

        let completion = slot.borrow_mut().take();
        if let Some(completion) = completion {
            completion(success);
        }
    }

    fn idle_with(&self, reason: StatusChangeReason) {
        self.interrupt();
        self.set_status(ViewportStatus::Idle, reason);
    }

    /// Stop the active state or transition. An interrupted transition fails:
    /// status goes `Idle` first, then its completion hears `false`.
    ///
    /// That completion may start another transition; it is interrupted in
    /// turn, so the caller always leaves this with nothing running.
    fn interrupt(&self) {
        loop {
            let (current, was_transition) = {
                let mut inner = self.inner.borrow_mut();
                inner.generation = inner.generation.wrapping_add(1);
                let was_transition = matches!(inner.status, ViewportStatus::Transition { .. });
                (inner.current.take(), was_transition)
            };
            if current.is_none() && !was_transition {
                return;
            }
            if was_transition {
                self.set_status(ViewportStatus::Idle, StatusChangeReason::TransitionFailed);
            }
            if let Some(mut current) = current {
                current.cancel();
            }
        }
    }

    fn bump_generation(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        inner.generation = inner.generation.wrapping_add(1);
        inner.generation
    }

    fn set_status(&self, status: ViewportStatus, reason: StatusChangeReason) {
        let (from, queue) = {
            let mut inner = self.inner.borrow_mut();
            let from = std::mem::replace(&mut inner.status, status.clone());
            (from, inner.queue.clone())
        };
        if from == status {
            return;
        }
        debug!("viewport status {from} -> {status} ({reason:?})");

        let weak: Weak<RefCell<ControllerInner>> = Rc::downgrade(&self.inner);
        queue.post(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let observers = inner.borrow().observers.clone();
            drop(inner);
            for observer in observers {
                observer
                    .borrow_mut()
                    .viewport_status_did_change(&from, &status, reason);
            }
        });
    }
}

fn same_observer(a: &SharedObserver, b: &SharedObserver) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}
