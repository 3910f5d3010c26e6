//! AnimatorRunner: registry and frame driver for every live animator.
//!
//! Animators live in an arena keyed by [`AnimatorId`]. Arena membership is the
//! "weak" registry: a slot is collected once it is not running and every
//! [`AnimatorHandle`] for it has been dropped. The running set is the "strong"
//! registry: an animator inside it stays alive without any handle.
//!
//! User callbacks (animation frames, completions, status listeners, sink
//! session notifications) are always invoked after the runner's internal
//! borrow has been released, so they may call back into the runner.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use indexmap::IndexSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::animator::{
    AnimatingPosition, AnimationFn, AnimationOwner, AnimationType, Animator, AnimatorState,
    AnimatorStatus, Step,
};
use crate::camera::SharedSink;
use crate::cancel::Cancelable;
use crate::clock::{EnableGate, FrameClock, NoopFrameClock, SystemTime, TimeProvider};
use crate::config::Config;
use crate::error::AnimationError;
use crate::ids::{AnimatorId, IdAllocator, ListenerId};
use crate::scheduler::TaskQueue;

/// Status edge delivered to runner listeners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorStatusEvent {
    pub id: AnimatorId,
    pub owner: AnimationOwner,
    pub animation_type: AnimationType,
    pub status: AnimatorStatus,
}

/// Snapshot of one registered animator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimatorInfo {
    pub id: AnimatorId,
    pub owner: AnimationOwner,
    pub animation_type: AnimationType,
    pub state: AnimatorState,
    pub fraction_complete: f64,
}

type Listener = Rc<dyn Fn(&AnimatorStatusEvent)>;

/// Collaborators a runner is built from.
pub struct RunnerContext {
    pub sink: SharedSink,
    pub time: Rc<dyn TimeProvider>,
    pub clock: Box<dyn FrameClock>,
    pub gate: EnableGate,
    pub queue: TaskQueue,
}

impl RunnerContext {
    /// Wall-clock time, no frame clock, gate enabled, fresh task queue.
    pub fn new(sink: SharedSink) -> Self {
        Self {
            sink,
            time: Rc::new(SystemTime::new()),
            clock: Box::new(NoopFrameClock),
            gate: EnableGate::new(true),
            queue: TaskQueue::new(),
        }
    }

    pub fn with_time(mut self, time: Rc<dyn TimeProvider>) -> Self {
        self.time = time;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn FrameClock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_gate(mut self, gate: EnableGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_queue(mut self, queue: TaskQueue) -> Self {
        self.queue = queue;
        self
    }

    /// Gate initialised from [`Config::starts_enabled`].
    pub fn with_config(mut self, config: &Config) -> Self {
        self.gate = EnableGate::new(config.starts_enabled);
        self
    }
}

struct Slot {
    animator: Animator,
    token: Weak<()>,
}

pub(crate) struct RunnerInner {
    slots: HashMap<AnimatorId, Slot>,
    running: IndexSet<AnimatorId>,
    gate: EnableGate,
    time: Rc<dyn TimeProvider>,
    clock: Box<dyn FrameClock>,
    sink: SharedSink,
    queue: TaskQueue,
    listeners: Vec<(ListenerId, Listener)>,
    ids: IdAllocator,
}

impl RunnerInner {
    /// Keep the running set in step with the animator state. Returns
    /// (session began, session ended).
    fn track(&mut self, id: AnimatorId, was_running: bool, is_running: bool) -> (bool, bool) {
        match (was_running, is_running) {
            (false, true) => {
                self.running.insert(id);
                self.clock.subscribe(id);
                (self.running.len() == 1, false)
            }
            (true, false) => {
                self.running.shift_remove(&id);
                self.clock.unsubscribe(id);
                (false, self.running.is_empty())
            }
            _ => (false, false),
        }
    }
}

/// Effects gathered under the borrow and delivered after it is released.
#[derive(Default)]
struct Outcome {
    step: Step,
    began: bool,
    ended: bool,
    event: Option<AnimatorStatusEvent>,
}

/// Cheap-to-clone handle to a runner; clones share the same registry.
#[derive(Clone)]
pub struct AnimatorRunner {
    inner: Rc<RefCell<RunnerInner>>,
}

impl fmt::Debug for AnimatorRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("AnimatorRunner")
            .field("animators", &inner.slots.len())
            .field("running", &inner.running.len())
            .field("enabled", &inner.gate.is_enabled())
            .finish()
    }
}

impl AnimatorRunner {
    pub fn new(ctx: RunnerContext) -> Self {
        let RunnerContext {
            sink,
            time,
            clock,
            gate,
            queue,
        } = ctx;
        Self {
            inner: Rc::new(RefCell::new(RunnerInner {
                slots: HashMap::new(),
                running: IndexSet::new(),
                gate,
                time,
                clock,
                sink,
                queue,
                listeners: Vec::new(),
                ids: IdAllocator::new(),
            })),
        }
    }

    pub fn sink(&self) -> SharedSink {
        self.inner.borrow().sink.clone()
    }

    pub fn queue(&self) -> TaskQueue {
        self.inner.borrow().queue.clone()
    }

    pub fn now(&self) -> f64 {
        self.inner.borrow().time.now()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.borrow().gate.is_enabled()
    }

    /// Flip the gate. Disabling cancels every registered animator.
    pub fn set_enabled(&self, enabled: bool) {
        let was = {
            let inner = self.inner.borrow();
            let was = inner.gate.is_enabled();
            inner.gate.set(enabled);
            was
        };
        if was && !enabled {
            debug!("animator runner disabled; cancelling all animators");
            self.cancel_animations();
        }
    }

    /// Register an animator. While the gate is off it is stopped at once.
    pub fn add(&self, animator: Animator) -> AnimatorHandle {
        let token = Rc::new(());
        let (id, began) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.ids.alloc_animator();
            let is_running = animator.is_running();
            inner.slots.insert(
                id,
                Slot {
                    animator,
                    token: Rc::downgrade(&token),
                },
            );
            let (began, _) = inner.track(id, false, is_running);
            (id, began)
        };
        if began {
            self.notify_session(true);
        }
        debug!("registered {id}");
        let handle = AnimatorHandle {
            id,
            runner: Rc::downgrade(&self.inner),
            token,
        };
        if !self.is_enabled() {
            debug!("runner disabled; stopping {id} on registration");
            self.drive(id, |a, _| a.stop_animation());
        }
        handle
    }

    /// Tick every running animator, in the order they started running.
    pub fn update(&self, target_time: f64) {
        if !self.is_enabled() {
            self.cancel_animations();
            return;
        }
        let running: Vec<AnimatorId> = self.inner.borrow().running.iter().copied().collect();
        for id in running {
            let still_running = self.inner.borrow().running.contains(&id);
            if still_running {
                self.drive(id, |a, _| a.update(target_time));
            }
        }
    }

    /// Stop every registered animator; completions receive `Current`.
    pub fn cancel_animations(&self) {
        self.cancel_where(|_| true);
    }

    pub fn cancel_animations_with_owners(&self, owners: &[AnimationOwner]) {
        self.cancel_where(|a| owners.contains(a.owner()));
    }

    pub fn cancel_animations_with_owners_and_types(
        &self,
        owners: &[AnimationOwner],
        types: &[AnimationType],
    ) {
        self.cancel_where(|a| owners.contains(a.owner()) && types.contains(a.animation_type()));
    }

    fn cancel_where(&self, pred: impl Fn(&Animator) -> bool) {
        let mut ids: Vec<AnimatorId> = self
            .inner
            .borrow()
            .slots
            .iter()
            .filter(|(_, s)| !s.animator.is_final() && pred(&s.animator))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        for id in ids {
            self.drive(id, |a, _| a.stop_animation());
        }
    }

    /// Registered animators ordered by id.
    pub fn animators(&self) -> Vec<AnimatorInfo> {
        let inner = self.inner.borrow();
        let mut out: Vec<AnimatorInfo> = inner
            .slots
            .iter()
            .map(|(id, s)| AnimatorInfo {
                id: *id,
                owner: s.animator.owner().clone(),
                animation_type: s.animator.animation_type().clone(),
                state: s.animator.state(),
                fraction_complete: s.animator.fraction_complete(),
            })
            .collect();
        out.sort_unstable_by_key(|info| info.id);
        out
    }

    /// Running animators in tick order.
    pub fn running_ids(&self) -> Vec<AnimatorId> {
        self.inner.borrow().running.iter().copied().collect()
    }

    pub fn state_of(&self, id: AnimatorId) -> Result<AnimatorState, AnimationError> {
        self.inner
            .borrow()
            .slots
            .get(&id)
            .map(|s| s.animator.state())
            .ok_or(AnimationError::UnknownAnimator { id })
    }

    pub fn on_status_changed(
        &self,
        listener: impl Fn(&AnimatorStatusEvent) + 'static,
    ) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = inner.ids.alloc_listener();
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn remove_status_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    /// Apply `op` to one animator and deliver everything it produced.
    fn drive(&self, id: AnimatorId, op: impl FnOnce(&mut Animator, f64) -> Step) -> bool {
        let outcome = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let now = inner.time.now();
            let Some(slot) = inner.slots.get_mut(&id) else {
                debug!("{id} is no longer registered; ignoring");
                return false;
            };
            let was_running = slot.animator.is_running();
            let step = op(&mut slot.animator, now);
            let is_running = slot.animator.is_running();
            let event = step.status.map(|status| AnimatorStatusEvent {
                id,
                owner: slot.animator.owner().clone(),
                animation_type: slot.animator.animation_type().clone(),
                status,
            });
            let (began, ended) = inner.track(id, was_running, is_running);
            Outcome {
                step,
                began,
                ended,
                event,
            }
        };
        self.deliver(id, outcome);
        true
    }

    fn deliver(&self, id: AnimatorId, outcome: Outcome) {
        let Outcome {
            step,
            began,
            ended,
            event,
        } = outcome;

        if began {
            self.notify_session(true);
        }
        if let Some(fraction) = step.frame {
            self.deliver_frame(id, fraction);
        }
        if ended {
            self.notify_session(false);
        }
        if let Some(event) = event {
            debug!("{} ({}) -> {:?}", event.id, event.owner, event.status);
            let listeners: Vec<Listener> = self
                .inner
                .borrow()
                .listeners
                .iter()
                .map(|(_, l)| l.clone())
                .collect();
            for listener in listeners {
                listener(&event);
            }
        }
        if let Some(finished) = step.finished {
            finished.fire();
        }
        self.release_if_final(id);
        self.collect_garbage();
    }

    fn notify_session(&self, began: bool) {
        let sink = self.sink();
        if began {
            debug!("animation session began");
            sink.borrow_mut().begin_animation();
        } else {
            debug!("animation session ended");
            sink.borrow_mut().end_animation();
        }
    }

    fn deliver_frame(&self, id: AnimatorId, fraction: f64) {
        let taken = self
            .inner
            .borrow_mut()
            .slots
            .get_mut(&id)
            .map(|s| s.animator.take_animations());
        let Some(mut animations) = taken else {
            return;
        };
        for animation in animations.iter_mut() {
            animation(fraction);
        }
        let leftover: Option<Vec<AnimationFn>> = {
            let mut inner = self.inner.borrow_mut();
            match inner.slots.get_mut(&id) {
                Some(slot) => slot.animator.restore_animations(animations),
                None => Some(animations),
            }
        };
        drop(leftover);
    }

    fn release_if_final(&self, id: AnimatorId) {
        let released: Option<Vec<AnimationFn>> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .slots
                .get_mut(&id)
                .filter(|s| s.animator.is_final())
                .map(|s| s.animator.take_animations())
        };
        drop(released);
    }

    /// Drop slots that are neither running nor referenced by a handle.
    fn collect_garbage(&self) {
        let dead: Vec<Slot> = {
            let mut guard = self.inner.borrow_mut();
            let RunnerInner { slots, running, .. } = &mut *guard;
            let ids: Vec<AnimatorId> = slots
                .iter()
                .filter(|(id, s)| !running.contains(*id) && s.token.strong_count() == 0)
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter().filter_map(|id| slots.remove(&id)).collect()
        };
        if !dead.is_empty() {
            debug!("collected {} unreferenced animator(s)", dead.len());
        }
        drop(dead);
    }

    fn with_slot<R>(&self, id: AnimatorId, f: impl FnOnce(&mut Animator) -> R) -> Option<R> {
        let mut inner = self.inner.borrow_mut();
        inner.slots.get_mut(&id).map(|s| f(&mut s.animator))
    }
}

/// External owning reference to a registered animator.
///
/// Cloning shares ownership. Once every clone is dropped, the animator is
/// collected as soon as it is not running. Methods are no-ops after the runner
/// itself has been dropped.
#[derive(Clone)]
pub struct AnimatorHandle {
    id: AnimatorId,
    runner: Weak<RefCell<RunnerInner>>,
    token: Rc<()>,
}

impl fmt::Debug for AnimatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatorHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

impl PartialEq for AnimatorHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.runner.ptr_eq(&other.runner)
    }
}

impl AnimatorHandle {
    pub fn id(&self) -> AnimatorId {
        self.id
    }

    fn runner(&self) -> Option<AnimatorRunner> {
        match self.runner.upgrade() {
            Some(inner) => Some(AnimatorRunner { inner }),
            None => {
                debug!("runner for {} is gone", self.id);
                None
            }
        }
    }

    fn drive(&self, op: impl FnOnce(&mut Animator, f64) -> Step) {
        if let Some(runner) = self.runner() {
            runner.drive(self.id, op);
        }
    }

    pub fn start_animation(&self) {
        self.drive(|a, now| a.start_animation(now));
    }

    /// # Panics
    /// When `delay` is negative or the animator is paused.
    pub fn start_animation_after_delay(&self, delay: f64) {
        self.drive(|a, now| a.start_animation_after_delay(now, delay));
    }

    pub fn pause_animation(&self) {
        self.drive(|a, now| a.pause_animation(now));
    }

    pub fn stop_animation(&self) {
        self.drive(|a, _| a.stop_animation());
    }

    pub fn set_fraction_complete(&self, fraction: f64) {
        self.drive(|a, _| a.set_fraction_complete(fraction));
    }

    pub fn add_animations(&self, animation: impl FnMut(f64) + 'static) {
        if let Some(runner) = self.runner() {
            runner.with_slot(self.id, |a| a.add_animations(Box::new(animation)));
        }
    }

    /// Queue a completion. On a final animator it is posted to the task queue
    /// and runs on the next turn with the stored terminal value.
    pub fn add_completion(&self, completion: impl FnOnce(AnimatingPosition) + 'static) {
        let Some(runner) = self.runner() else {
            return;
        };
        let handed_back = runner
            .with_slot(self.id, |a| a.add_completion(Box::new(completion)))
            .flatten();
        if let Some(finished) = handed_back {
            runner.queue().post(move || finished.fire());
        }
    }

    /// Current state; `Final(Current)` once the runner is gone.
    pub fn state(&self) -> AnimatorState {
        self.runner()
            .and_then(|r| r.with_slot(self.id, |a| a.state()))
            .unwrap_or(AnimatorState::Final(AnimatingPosition::Current))
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), AnimatorState::Running { .. })
    }

    pub fn fraction_complete(&self) -> f64 {
        self.runner()
            .and_then(|r| r.with_slot(self.id, |a| a.fraction_complete()))
            .unwrap_or(0.0)
    }

    pub fn owner(&self) -> Option<AnimationOwner> {
        self.runner()
            .and_then(|r| r.with_slot(self.id, |a| a.owner().clone()))
    }

    pub fn animation_type(&self) -> Option<AnimationType> {
        self.runner()
            .and_then(|r| r.with_slot(self.id, |a| a.animation_type().clone()))
    }

    pub fn set_reversed(&self, reversed: bool) {
        if let Some(runner) = self.runner() {
            runner.with_slot(self.id, |a| a.set_reversed(reversed));
        }
    }

    pub fn set_pauses_on_completion(&self, pauses: bool) {
        if let Some(runner) = self.runner() {
            runner.with_slot(self.id, |a| a.set_pauses_on_completion(pauses));
        }
    }
}

impl From<AnimatorHandle> for Cancelable {
    fn from(handle: AnimatorHandle) -> Self {
        Cancelable::new(move || handle.stop_animation())
    }
}
