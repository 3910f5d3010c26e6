//! Single camera animation: a frame-driven state machine.
//!
//! An [`Animator`] never reads a clock on its own. Every transition takes the
//! current time as an argument and returns a [`Step`] describing what the
//! caller must deliver (status edge, one frame, completions). The runner uses
//! this split to invoke user callbacks after releasing its own borrow; a
//! standalone owner can call [`Animator::perform`] instead.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timing::{TimingCurve, UnitBezier};

/// Tag naming the subsystem that created an animator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationOwner(Cow<'static, str>);

impl AnimationOwner {
    pub const UNSPECIFIED: AnimationOwner = AnimationOwner(Cow::Borrowed("unspecified"));
    pub const GESTURES: AnimationOwner = AnimationOwner(Cow::Borrowed("gestures"));
    pub const CAMERA_ANIMATIONS_MANAGER: AnimationOwner =
        AnimationOwner(Cow::Borrowed("cameraAnimationsManager"));
    pub const DEFAULT_VIEWPORT_TRANSITION: AnimationOwner =
        AnimationOwner(Cow::Borrowed("defaultViewportTransition"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Owner usable in `const` items.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Secondary classification tag, used with owners for selective cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationType(Cow<'static, str>);

impl AnimationType {
    pub const UNSPECIFIED: AnimationType = AnimationType(Cow::Borrowed("unspecified"));
    pub const DECELERATION: AnimationType = AnimationType(Cow::Borrowed("deceleration"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Terminal value passed to completions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimatingPosition {
    /// Ran to its natural end.
    End,
    /// Stopped early; the camera stays wherever the last frame left it.
    Current,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum AnimatorState {
    Initial,
    /// `start_time` may lie in the future for delayed starts.
    Running { start_time: f64 },
    /// `elapsed` seconds of progress are preserved for resumption.
    Paused { elapsed: f64 },
    Final(AnimatingPosition),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopReason {
    Finished,
    Cancelled,
}

/// Status edges reported to runner listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimatorStatus {
    Started,
    Paused,
    Stopped(StopReason),
}

pub type AnimationFn = Box<dyn FnMut(f64)>;
pub type CompletionFn = Box<dyn FnOnce(AnimatingPosition)>;

/// Completions detached from an animator that just reached `Final`.
#[must_use = "completions only run when fired"]
pub struct Finished {
    pub position: AnimatingPosition,
    callbacks: Vec<CompletionFn>,
}

impl Finished {
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every completion in registration order.
    pub fn fire(self) {
        let position = self.position;
        for cb in self.callbacks {
            cb(position);
        }
    }
}

impl fmt::Debug for Finished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Finished")
            .field("position", &self.position)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

/// Work produced by one transition.
#[derive(Debug, Default)]
#[must_use = "a step carries callbacks that must be delivered"]
pub struct Step {
    pub status: Option<AnimatorStatus>,
    /// Eased fraction to hand to every animation callback.
    pub frame: Option<f64>,
    pub finished: Option<Finished>,
}

pub struct Animator {
    owner: AnimationOwner,
    animation_type: AnimationType,
    state: AnimatorState,
    duration: f64,
    timing_curve: TimingCurve,
    bezier: UnitBezier,
    epsilon: f64,
    is_reversed: bool,
    pauses_on_completion: bool,
    repeat_count: u32,
    autoreverses: bool,
    scrubs_linearly: bool,
    fraction_complete: f64,
    animations: Vec<AnimationFn>,
    completions: Vec<CompletionFn>,
}

impl fmt::Debug for Animator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("owner", &self.owner)
            .field("animation_type", &self.animation_type)
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("fraction_complete", &self.fraction_complete)
            .field("animations", &self.animations.len())
            .field("completions", &self.completions.len())
            .finish()
    }
}

impl Animator {
    /// # Panics
    /// When `duration` is negative or not finite.
    pub fn new(duration: f64, curve: TimingCurve, owner: AnimationOwner) -> Self {
        assert!(
            duration.is_finite() && duration >= 0.0,
            "animator duration must be finite and non-negative, got {duration}"
        );
        Self {
            owner,
            animation_type: AnimationType::UNSPECIFIED,
            state: AnimatorState::Initial,
            duration,
            timing_curve: curve,
            bezier: curve.solver(),
            epsilon: 1e-6,
            is_reversed: false,
            pauses_on_completion: false,
            repeat_count: 0,
            autoreverses: false,
            scrubs_linearly: true,
            fraction_complete: 0.0,
            animations: Vec::new(),
            completions: Vec::new(),
        }
    }

    pub fn with_type(mut self, animation_type: AnimationType) -> Self {
        self.animation_type = animation_type;
        self
    }

    /// Extra cycles after the first one.
    pub fn with_repeat_count(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    pub fn with_autoreverses(mut self, autoreverses: bool) -> Self {
        self.autoreverses = autoreverses;
        self
    }

    pub fn with_solver_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_scrubs_linearly(mut self, scrubs_linearly: bool) -> Self {
        self.scrubs_linearly = scrubs_linearly;
        self
    }

    pub fn with_animation(mut self, animation: impl FnMut(f64) + 'static) -> Self {
        self.animations.push(Box::new(animation));
        self
    }

    pub fn owner(&self) -> &AnimationOwner {
        &self.owner
    }

    pub fn animation_type(&self) -> &AnimationType {
        &self.animation_type
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimatorState::Running { .. })
    }

    pub fn is_final(&self) -> bool {
        matches!(self.state, AnimatorState::Final(_))
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn timing_curve(&self) -> TimingCurve {
        self.timing_curve
    }

    pub fn fraction_complete(&self) -> f64 {
        self.fraction_complete
    }

    pub fn is_reversed(&self) -> bool {
        self.is_reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.is_reversed = reversed;
    }

    pub fn pauses_on_completion(&self) -> bool {
        self.pauses_on_completion
    }

    pub fn set_pauses_on_completion(&mut self, pauses: bool) {
        self.pauses_on_completion = pauses;
    }

    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    pub fn autoreverses(&self) -> bool {
        self.autoreverses
    }

    pub fn start_animation(&mut self, now: f64) -> Step {
        match self.state {
            AnimatorState::Initial => {
                self.state = AnimatorState::Running { start_time: now };
                started()
            }
            AnimatorState::Paused { elapsed } => {
                self.state = AnimatorState::Running {
                    start_time: now - elapsed,
                };
                started()
            }
            AnimatorState::Running { .. } | AnimatorState::Final(_) => Step::default(),
        }
    }

    /// # Panics
    /// When `delay` is negative or not finite, or when the animator is paused.
    pub fn start_animation_after_delay(&mut self, now: f64, delay: f64) -> Step {
        assert!(
            delay.is_finite() && delay >= 0.0,
            "start delay must be finite and non-negative, got {delay}"
        );
        match self.state {
            AnimatorState::Initial => {
                self.state = AnimatorState::Running {
                    start_time: now + delay,
                };
                started()
            }
            AnimatorState::Paused { .. } => {
                panic!("a paused animator cannot be started with a delay")
            }
            AnimatorState::Running { .. } | AnimatorState::Final(_) => Step::default(),
        }
    }

    pub fn pause_animation(&mut self, now: f64) -> Step {
        match self.state {
            AnimatorState::Initial => {
                self.state = AnimatorState::Paused { elapsed: 0.0 };
                Step::default()
            }
            AnimatorState::Running { start_time } => {
                self.state = AnimatorState::Paused {
                    elapsed: (now - start_time).max(0.0),
                };
                Step {
                    status: Some(AnimatorStatus::Paused),
                    ..Step::default()
                }
            }
            AnimatorState::Paused { .. } | AnimatorState::Final(_) => Step::default(),
        }
    }

    pub fn stop_animation(&mut self) -> Step {
        if self.is_final() {
            return Step::default();
        }
        self.state = AnimatorState::Final(AnimatingPosition::Current);
        Step {
            status: Some(AnimatorStatus::Stopped(StopReason::Cancelled)),
            frame: None,
            finished: Some(self.take_finished(AnimatingPosition::Current)),
        }
    }

    /// Advance to `target_time`. Only meaningful while running.
    pub fn update(&mut self, target_time: f64) -> Step {
        let AnimatorState::Running { start_time } = self.state else {
            return Step::default();
        };
        if target_time <= start_time {
            return Step::default();
        }
        let elapsed = target_time - start_time;
        let cycle = if self.duration > 0.0 {
            (elapsed / self.duration).floor()
        } else {
            f64::INFINITY
        };

        if cycle > f64::from(self.repeat_count) {
            return self.complete_or_pause();
        }

        let progress = (elapsed % self.duration) / self.duration;
        self.fraction_complete = progress;
        let linear = if self.autoreverses && cycle % 2.0 == 1.0 {
            1.0 - progress
        } else {
            progress
        };
        Step {
            frame: Some(self.ease(self.oriented(linear))),
            ..Step::default()
        }
    }

    /// Scrub to `fraction`. Moves `Initial`/`Paused` animators to `Paused` at
    /// that point and delivers one frame; ignored while running or final.
    pub fn set_fraction_complete(&mut self, fraction: f64) -> Step {
        match self.state {
            AnimatorState::Initial | AnimatorState::Paused { .. } => {
                let f = fraction.clamp(0.0, 1.0);
                self.fraction_complete = f;
                self.state = AnimatorState::Paused {
                    elapsed: f * self.duration,
                };
                let frame = if self.scrubs_linearly { f } else { self.ease(f) };
                Step {
                    frame: Some(frame),
                    ..Step::default()
                }
            }
            AnimatorState::Running { .. } | AnimatorState::Final(_) => Step::default(),
        }
    }

    pub fn add_animations(&mut self, animation: AnimationFn) {
        self.animations.push(animation);
    }

    /// Queue a completion. On a final animator the callback is handed back,
    /// bound to the stored terminal value, for the caller to schedule.
    pub fn add_completion(&mut self, completion: CompletionFn) -> Option<Finished> {
        match self.state {
            AnimatorState::Final(position) => Some(Finished {
                position,
                callbacks: vec![completion],
            }),
            _ => {
                self.completions.push(completion);
                None
            }
        }
    }

    pub fn take_animations(&mut self) -> Vec<AnimationFn> {
        std::mem::take(&mut self.animations)
    }

    /// Put back callbacks taken for delivery, ahead of any added meanwhile.
    /// Final animators no longer accept frames, so the callbacks are returned
    /// for the caller to drop.
    pub fn restore_animations(&mut self, mut taken: Vec<AnimationFn>) -> Option<Vec<AnimationFn>> {
        if self.is_final() {
            taken.append(&mut self.animations);
            return Some(taken);
        }
        taken.append(&mut self.animations);
        self.animations = taken;
        None
    }

    /// Deliver a step directly, for animators driven without a runner.
    pub fn perform(&mut self, step: Step) {
        if let Some(f) = step.frame {
            for animation in self.animations.iter_mut() {
                animation(f);
            }
        }
        if self.is_final() {
            self.animations.clear();
        }
        if let Some(finished) = step.finished {
            finished.fire();
        }
    }

    fn complete_or_pause(&mut self) -> Step {
        let landing = if self.autoreverses && self.repeat_count % 2 == 1 {
            0.0
        } else {
            1.0
        };
        self.fraction_complete = 1.0;
        let frame = Some(self.oriented(landing));
        if self.pauses_on_completion {
            self.state = AnimatorState::Paused {
                elapsed: self.duration * (f64::from(self.repeat_count) + 1.0),
            };
            return Step {
                status: Some(AnimatorStatus::Paused),
                frame,
                finished: None,
            };
        }
        self.state = AnimatorState::Final(AnimatingPosition::End);
        Step {
            status: Some(AnimatorStatus::Stopped(StopReason::Finished)),
            frame,
            finished: Some(self.take_finished(AnimatingPosition::End)),
        }
    }

    fn take_finished(&mut self, position: AnimatingPosition) -> Finished {
        Finished {
            position,
            callbacks: std::mem::take(&mut self.completions),
        }
    }

    #[inline]
    fn oriented(&self, linear: f64) -> f64 {
        if self.is_reversed {
            1.0 - linear
        } else {
            linear
        }
    }

    #[inline]
    fn ease(&self, linear: f64) -> f64 {
        self.bezier.solve(linear, self.epsilon)
    }
}

fn started() -> Step {
    Step {
        status: Some(AnimatorStatus::Started),
        ..Step::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64) + 'static) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = frames.clone();
        (frames, move |f| sink.borrow_mut().push(f))
    }

    fn positions() -> (Rc<RefCell<Vec<AnimatingPosition>>>, CompletionFn) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        (seen, Box::new(move |p| s.borrow_mut().push(p)))
    }

    #[test]
    fn linear_one_second_scenario() {
        let (frames, rec) = recorder();
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED)
            .with_animation(rec);
        let (seen, done) = positions();
        assert!(a.add_completion(done).is_none());

        let s = a.start_animation(0.0);
        assert_eq!(s.status, Some(AnimatorStatus::Started));
        a.perform(s);

        let s = a.update(0.5);
        a.perform(s);
        assert!((frames.borrow()[0] - 0.5).abs() < 1e-9);

        let s = a.update(1.0);
        assert_eq!(
            s.status,
            Some(AnimatorStatus::Stopped(StopReason::Finished))
        );
        a.perform(s);
        assert_eq!(a.state(), AnimatorState::Final(AnimatingPosition::End));
        assert_eq!(*seen.borrow(), vec![AnimatingPosition::End]);
        assert_eq!(frames.borrow().last().copied(), Some(1.0));
    }

    #[test]
    fn double_stop_fires_once() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        let (seen, done) = positions();
        let _ = a.add_completion(done);
        let s = a.start_animation(0.0);
        a.perform(s);
        let s = a.stop_animation();
        a.perform(s);
        let s = a.stop_animation();
        assert!(s.finished.is_none() && s.status.is_none());
        a.perform(s);
        assert_eq!(*seen.borrow(), vec![AnimatingPosition::Current]);
    }

    #[test]
    fn completion_after_final_is_handed_back() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        let s = a.stop_animation();
        a.perform(s);
        let (seen, done) = positions();
        let finished = a.add_completion(done).expect("final animator returns completion");
        assert_eq!(finished.position, AnimatingPosition::Current);
        finished.fire();
        assert_eq!(*seen.borrow(), vec![AnimatingPosition::Current]);
    }

    #[test]
    fn start_is_noop_when_running_or_final() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        let _ = a.start_animation(1.0);
        let s = a.start_animation(5.0);
        assert!(s.status.is_none());
        assert_eq!(a.state(), AnimatorState::Running { start_time: 1.0 });
        let _ = a.stop_animation();
        let s = a.start_animation(6.0);
        assert!(s.status.is_none());
        assert!(a.is_final());
    }

    #[test]
    fn pause_preserves_progress() {
        let (frames, rec) = recorder();
        let mut a = Animator::new(2.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED)
            .with_animation(rec);
        let _ = a.start_animation(0.0);
        let s = a.pause_animation(0.5);
        assert_eq!(s.status, Some(AnimatorStatus::Paused));
        assert_eq!(a.state(), AnimatorState::Paused { elapsed: 0.5 });
        assert!(a.update(1.0).frame.is_none());

        let _ = a.start_animation(10.0);
        let s = a.update(10.5);
        a.perform(s);
        assert!((frames.borrow()[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn pause_from_initial_has_no_status() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        let s = a.pause_animation(3.0);
        assert!(s.status.is_none());
        assert_eq!(a.state(), AnimatorState::Paused { elapsed: 0.0 });
        assert!(a.pause_animation(4.0).status.is_none());
    }

    #[test]
    fn delayed_start_ignores_early_ticks() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        let _ = a.start_animation_after_delay(0.0, 2.0);
        assert!(a.update(1.5).frame.is_none());
        assert!(a.update(2.0).frame.is_none());
        let f = a.update(2.25).frame.unwrap();
        assert!((f - 0.25).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "paused animator")]
    fn delayed_start_from_paused_panics() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        let _ = a.pause_animation(0.0);
        let _ = a.start_animation_after_delay(0.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn negative_duration_panics() {
        let _ = Animator::new(-1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
    }

    #[test]
    fn autoreverse_runs_backwards_on_odd_cycles() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED)
            .with_repeat_count(1)
            .with_autoreverses(true);
        let _ = a.start_animation(0.0);
        assert!((a.update(0.25).frame.unwrap() - 0.25).abs() < 1e-9);
        assert!((a.update(1.25).frame.unwrap() - 0.75).abs() < 1e-9);
        let s = a.update(2.5);
        assert_eq!(s.frame, Some(0.0));
        assert!(s.finished.is_some());
    }

    #[test]
    fn zero_repeat_autoreverse_plays_forward_once() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED)
            .with_autoreverses(true);
        let _ = a.start_animation(0.0);
        let s = a.update(1.2);
        assert_eq!(s.frame, Some(1.0));
        assert_eq!(a.state(), AnimatorState::Final(AnimatingPosition::End));
    }

    #[test]
    fn reversed_mirrors_fraction() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        a.set_reversed(true);
        let _ = a.start_animation(0.0);
        assert!((a.update(0.25).frame.unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(a.update(1.0).frame, Some(0.0));
    }

    #[test]
    fn pauses_on_completion_holds_at_end() {
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED);
        a.set_pauses_on_completion(true);
        let (seen, done) = positions();
        let _ = a.add_completion(done);
        let _ = a.start_animation(0.0);
        let s = a.update(1.5);
        assert_eq!(s.status, Some(AnimatorStatus::Paused));
        assert_eq!(s.frame, Some(1.0));
        assert!(s.finished.is_none());
        assert_eq!(a.state(), AnimatorState::Paused { elapsed: 1.0 });
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn fraction_is_monotonic_within_a_cycle() {
        let mut a = Animator::new(1.0, TimingCurve::EASE_IN_OUT, AnimationOwner::UNSPECIFIED);
        let _ = a.start_animation(0.0);
        let mut last = 0.0;
        for i in 1..100 {
            let _ = a.update(i as f64 / 100.0);
            let f = a.fraction_complete();
            assert!(f >= last && (0.0..=1.0).contains(&f));
            last = f;
        }
    }

    #[test]
    fn scrubbing_moves_to_paused() {
        let mut a = Animator::new(2.0, TimingCurve::EASE_IN, AnimationOwner::UNSPECIFIED);
        let s = a.set_fraction_complete(0.25);
        assert_eq!(s.frame, Some(0.25));
        assert_eq!(a.state(), AnimatorState::Paused { elapsed: 0.5 });

        let mut eased = Animator::new(2.0, TimingCurve::EASE_IN, AnimationOwner::UNSPECIFIED)
            .with_scrubs_linearly(false);
        let f = eased.set_fraction_complete(0.25).frame.unwrap();
        assert!(f < 0.25);

        let _ = a.start_animation(0.0);
        assert!(a.set_fraction_complete(0.9).frame.is_none());
    }

    #[test]
    fn final_releases_animations() {
        let (frames, rec) = recorder();
        let mut a = Animator::new(1.0, TimingCurve::LINEAR, AnimationOwner::UNSPECIFIED)
            .with_animation(rec);
        let s = a.stop_animation();
        a.perform(s);
        assert_eq!(Rc::strong_count(&frames), 1);
    }
}
