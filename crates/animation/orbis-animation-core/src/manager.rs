//! High-level camera animation API built on the runner.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::animator::{AnimatingPosition, AnimationOwner, Animator};
use crate::camera::{CameraOptions, CameraState, SharedSink};
use crate::config::Config;
use crate::flyto::FlightPath;
use crate::interp::functions::interpolate_camera_options;
use crate::runner::{AnimatorHandle, AnimatorRunner};
use crate::timing::TimingCurve;

pub type Completion = Box<dyn FnOnce(AnimatingPosition)>;

/// Target camera of a running simple animator. Clones share the target.
#[derive(Clone, Debug)]
pub struct DynamicTarget(Rc<RefCell<CameraOptions>>);

impl DynamicTarget {
    fn new(to: CameraOptions) -> Self {
        Self(Rc::new(RefCell::new(to)))
    }

    pub fn get(&self) -> CameraOptions {
        *self.0.borrow()
    }

    /// Retarget the animation. The set of present fields is fixed when the
    /// animator is created; fields outside it are ignored and missing ones
    /// keep their previous value.
    pub fn set(&self, to: CameraOptions) {
        let mut current = self.0.borrow_mut();
        let mut next = *current;
        let mut mismatched = false;
        macro_rules! merge {
            ($field:ident) => {
                match (current.$field.is_some(), to.$field) {
                    (true, Some(v)) => next.$field = Some(v),
                    (false, Some(_)) | (true, None) => mismatched = true,
                    (false, None) => {}
                }
            };
        }
        merge!(center);
        merge!(padding);
        merge!(anchor);
        merge!(zoom);
        merge!(bearing);
        merge!(pitch);
        if mismatched {
            warn!("dynamic camera target updated with a different field set; extra fields ignored");
        }
        *current = next;
    }
}

/// Animator whose destination can move while it runs.
#[derive(Clone, Debug)]
pub struct SimpleAnimator {
    pub handle: AnimatorHandle,
    pub target: DynamicTarget,
}

/// Camera animation entry point: ease, fly and custom animators sharing one
/// runner and one sink.
#[derive(Clone)]
pub struct CameraAnimations {
    runner: AnimatorRunner,
    config: Config,
}

impl std::fmt::Debug for CameraAnimations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraAnimations")
            .field("runner", &self.runner)
            .field("config", &self.config)
            .finish()
    }
}

impl CameraAnimations {
    /// A config with `starts_enabled: false` switches the runner's gate off,
    /// which cancels anything already registered.
    pub fn new(runner: AnimatorRunner, config: Config) -> Self {
        if !config.starts_enabled {
            runner.set_enabled(false);
        }
        Self { runner, config }
    }

    pub fn runner(&self) -> &AnimatorRunner {
        &self.runner
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sink(&self) -> SharedSink {
        self.runner.sink()
    }

    pub fn camera_state(&self) -> CameraState {
        self.runner.sink().borrow().camera_state()
    }

    pub fn cancel_animations(&self) {
        self.runner.cancel_animations();
    }

    /// One frame-clock turn: tick the runner, then run deferred tasks.
    pub fn tick(&self, target_time: f64) {
        self.runner.update(target_time);
        self.runner.queue().run_pending();
    }

    /// Unstarted animator with a single animation callback.
    pub fn make_animator(
        &self,
        duration: f64,
        curve: TimingCurve,
        owner: AnimationOwner,
        animations: impl FnMut(f64) + 'static,
    ) -> AnimatorHandle {
        let animator = Animator::new(duration, curve, owner)
            .with_solver_epsilon(self.config.solver_epsilon)
            .with_animation(animations);
        self.runner.add(animator)
    }

    /// Unstarted animator from `from` towards a retargetable `to`. Only fields
    /// present in `to` are animated.
    pub fn make_simple_animator(
        &self,
        from: CameraState,
        to: CameraOptions,
        duration: f64,
        curve: TimingCurve,
        owner: AnimationOwner,
    ) -> SimpleAnimator {
        let target = DynamicTarget::new(to);
        let from = from.to_options();
        let sink = self.sink();
        let tracked = target.clone();
        let handle = self.make_animator(duration, curve, owner, move |f| {
            let step = interpolate_camera_options(&from, &tracked.get(), f);
            sink.borrow_mut().set_camera(&step);
        });
        SimpleAnimator { handle, target }
    }

    /// Interpolate from the current camera to `to`, cancelling earlier
    /// animations of the same owner first.
    pub fn ease_to(
        &self,
        to: CameraOptions,
        duration: f64,
        curve: TimingCurve,
        owner: AnimationOwner,
        completion: Option<Completion>,
    ) -> AnimatorHandle {
        self.runner.cancel_animations_with_owners(&[owner.clone()]);
        let from = self.camera_state();
        let simple = self.make_simple_animator(from, to, duration, curve, owner);
        if let Some(completion) = completion {
            simple.handle.add_completion(completion);
        }
        simple.handle.start_animation();
        debug!("ease_to over {duration}s as {}", simple.handle.id());
        simple.handle
    }

    /// Fly along a [`FlightPath`]. Uses the path's own duration unless one is given.
    pub fn fly_to(
        &self,
        to: CameraOptions,
        duration: Option<f64>,
        curve: TimingCurve,
        completion: Option<Completion>,
    ) -> AnimatorHandle {
        let owner = AnimationOwner::CAMERA_ANIMATIONS_MANAGER;
        self.runner.cancel_animations_with_owners(&[owner.clone()]);

        let sink = self.sink();
        let path = {
            let s = sink.borrow();
            FlightPath::new(
                &s.camera_state(),
                &to,
                &s.camera_bounds(),
                s.size(),
                &self.config.fly_to,
            )
        };
        let duration = duration.unwrap_or_else(|| path.duration());
        let handle = self.make_animator(duration, curve, owner, move |f| {
            sink.borrow_mut().set_camera(&path.at(f).to_options());
        });
        if let Some(completion) = completion {
            handle.add_completion(completion);
        }
        handle.start_animation();
        debug!("fly_to over {duration}s as {}", handle.id());
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Coordinate, MemorySink, ScreenSize};
    use crate::clock::ManualTime;
    use crate::runner::RunnerContext;
    use std::cell::Cell;

    fn setup() -> (CameraAnimations, Rc<RefCell<MemorySink>>, ManualTime) {
        let sink = MemorySink::new(
            CameraState {
                zoom: 2.0,
                ..Default::default()
            },
            ScreenSize::new(400.0, 300.0),
        )
        .shared();
        let time = ManualTime::new(0.0);
        let runner =
            AnimatorRunner::new(RunnerContext::new(sink.clone()).with_time(Rc::new(time.clone())));
        (CameraAnimations::new(runner, Config::default()), sink, time)
    }

    #[test]
    fn ease_to_lands_on_target() {
        let (cam, sink, _time) = setup();
        let done = Rc::new(Cell::new(None));
        let d = done.clone();
        cam.ease_to(
            CameraOptions {
                zoom: Some(4.0),
                bearing: Some(350.0),
                ..Default::default()
            },
            1.0,
            TimingCurve::LINEAR,
            AnimationOwner::UNSPECIFIED,
            Some(Box::new(move |p| d.set(Some(p)))),
        );
        cam.tick(0.5);
        assert!((sink.borrow().state.zoom - 3.0).abs() < 1e-9);
        assert!((sink.borrow().state.bearing - 355.0).abs() < 1e-9);
        cam.tick(1.0);
        assert_eq!(sink.borrow().state.zoom, 4.0);
        assert_eq!(done.get(), Some(AnimatingPosition::End));
    }

    #[test]
    fn ease_to_cancels_same_owner() {
        let (cam, _sink, _time) = setup();
        let owner = AnimationOwner::new("app");
        let ease = |owner| {
            cam.ease_to(
                CameraOptions::default(),
                1.0,
                TimingCurve::LINEAR,
                owner,
                None,
            )
        };
        let first = ease(owner.clone());
        let second = ease(owner);
        assert!(!first.is_running());
        assert!(second.is_running());
    }

    #[test]
    fn fly_to_reaches_destination() {
        let (cam, sink, _time) = setup();
        let dest = Coordinate::new(20.0, 30.0);
        let h = cam.fly_to(
            CameraOptions {
                center: Some(dest),
                zoom: Some(5.0),
                ..Default::default()
            },
            Some(2.0),
            TimingCurve::EASE_IN_OUT,
            None,
        );
        cam.tick(1.0);
        assert!(h.is_running());
        cam.tick(2.5);
        let s = sink.borrow().state;
        assert!((s.center.latitude - 20.0).abs() < 1e-9);
        assert!((s.center.longitude - 30.0).abs() < 1e-9);
        assert_eq!(s.zoom, 5.0);
    }

    #[test]
    fn config_can_start_with_the_gate_off() {
        let (cam, _sink, _time) = setup();
        let config = Config::from_json(r#"{ "starts_enabled": false }"#).unwrap();
        let disabled = CameraAnimations::new(cam.runner().clone(), config);
        assert!(!disabled.runner().is_enabled());
        let h = disabled.ease_to(
            CameraOptions {
                zoom: Some(4.0),
                ..Default::default()
            },
            1.0,
            TimingCurve::LINEAR,
            AnimationOwner::UNSPECIFIED,
            None,
        );
        assert!(!h.is_running());

        let sink = MemorySink::new(CameraState::default(), ScreenSize::new(10.0, 10.0)).shared();
        let runner = AnimatorRunner::new(RunnerContext::new(sink).with_config(&Config {
            starts_enabled: false,
            ..Default::default()
        }));
        assert!(!runner.is_enabled());
    }

    #[test]
    fn dynamic_target_retargets_running_animation() {
        let (cam, sink, _time) = setup();
        let simple = cam.make_simple_animator(
            cam.camera_state(),
            CameraOptions {
                zoom: Some(4.0),
                ..Default::default()
            },
            1.0,
            TimingCurve::LINEAR,
            AnimationOwner::UNSPECIFIED,
        );
        simple.handle.start_animation();
        simple.target.set(CameraOptions {
            zoom: Some(10.0),
            pitch: Some(30.0),
            ..Default::default()
        });
        assert_eq!(simple.target.get().pitch, None);
        cam.tick(0.5);
        assert!((sink.borrow().state.zoom - 6.0).abs() < 1e-9);
    }
}
