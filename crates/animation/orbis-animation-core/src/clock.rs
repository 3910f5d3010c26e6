//! Time sources and frame-clock subscription.
//!
//! The runner never reads wall time directly: it asks a [`TimeProvider`] for
//! "now" when stamping transitions and receives target times from whoever
//! drives [`AnimatorRunner::update`](crate::AnimatorRunner::update). A
//! [`FrameClock`] is told which animators need ticks so the host can stop its
//! display link when nothing is running.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

use indexmap::IndexSet;

use crate::ids::AnimatorId;

/// Source of the current time in seconds.
pub trait TimeProvider {
    fn now(&self) -> f64;
}

/// Monotonic wall clock, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    origin: Instant,
}

impl SystemTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTime {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualTime(Rc<Cell<f64>>);

impl ManualTime {
    pub fn new(start: f64) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn set(&self, t: f64) {
        self.0.set(t);
    }

    pub fn advance(&self, dt: f64) -> f64 {
        let t = self.0.get() + dt;
        self.0.set(t);
        t
    }
}

impl TimeProvider for ManualTime {
    fn now(&self) -> f64 {
        self.0.get()
    }
}

/// Per-animator tick subscription, driven by running-set membership.
pub trait FrameClock {
    fn subscribe(&mut self, id: AnimatorId);
    fn unsubscribe(&mut self, id: AnimatorId);
}

/// Clock for hosts that tick unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFrameClock;

impl FrameClock for NoopFrameClock {
    fn subscribe(&mut self, _id: AnimatorId) {}
    fn unsubscribe(&mut self, _id: AnimatorId) {}
}

/// Clock that records subscribers; clones observe the same set.
#[derive(Debug, Default, Clone)]
pub struct ManualFrameClock {
    subscribers: Rc<RefCell<IndexSet<AnimatorId>>>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while at least one animator wants ticks.
    pub fn is_active(&self) -> bool {
        !self.subscribers.borrow().is_empty()
    }

    pub fn subscribers(&self) -> Vec<AnimatorId> {
        self.subscribers.borrow().iter().copied().collect()
    }
}

impl FrameClock for ManualFrameClock {
    fn subscribe(&mut self, id: AnimatorId) {
        self.subscribers.borrow_mut().insert(id);
    }

    fn unsubscribe(&mut self, id: AnimatorId) {
        self.subscribers.borrow_mut().shift_remove(&id);
    }
}

/// Shared enable flag consulted by the runner on every tick and add.
#[derive(Debug, Clone)]
pub struct EnableGate(Rc<Cell<bool>>);

impl EnableGate {
    pub fn new(enabled: bool) -> Self {
        Self(Rc::new(Cell::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.get()
    }

    pub fn set(&self, enabled: bool) {
        self.0.set(enabled);
    }
}

impl Default for EnableGate {
    fn default() -> Self {
        Self::new(true)
    }
}
