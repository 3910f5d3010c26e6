//! Default transition: one eased animator per camera component, retargeted
//! as the destination state keeps publishing cameras.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use orbis_animation_core::{
    AnimatingPosition, AnimationOwner, CameraAnimations, CameraOptions, CameraState, Cancelable,
    SimpleAnimator, TimingCurve,
};

use super::plan::{plan_transition, AnimationSpec, CameraComponent};
use crate::config::DefaultTransitionOptions;
use crate::error::ViewportError;
use crate::state::{StateRef, TransitionCompletion, ViewportTransition};

/// Eases from the current camera to the target state's camera following
/// [`plan_transition`]. Succeeds when every component lands.
pub struct DefaultTransition {
    camera: CameraAnimations,
    options: Cell<DefaultTransitionOptions>,
}

impl DefaultTransition {
    pub fn new(
        camera: CameraAnimations,
        options: DefaultTransitionOptions,
    ) -> Result<Self, ViewportError> {
        options.validate()?;
        Ok(Self {
            camera,
            options: Cell::new(options),
        })
    }

    pub fn options(&self) -> DefaultTransitionOptions {
        self.options.get()
    }

    pub fn set_options(&self, options: DefaultTransitionOptions) -> Result<(), ViewportError> {
        options.validate()?;
        self.options.set(options);
        Ok(())
    }
}

/// One run of the transition; lives until it finishes or is cancelled.
#[derive(Default)]
struct Run {
    animation: Option<Rc<TransitionAnimation>>,
    observation: Option<Cancelable>,
    completion: Option<TransitionCompletion>,
    finished: bool,
}

impl ViewportTransition for DefaultTransition {
    fn run(&self, to: &StateRef, completion: TransitionCompletion) -> Cancelable {
        let run = Rc::new(RefCell::new(Run {
            completion: Some(completion),
            ..Default::default()
        }));
        let camera = self.camera.clone();
        let max_duration = self.options.get().max_duration;

        let tracked = run.clone();
        let observation = to.state().observe_data_source(Box::new(move |target| {
            if tracked.borrow().finished {
                return false;
            }
            let existing = tracked.borrow().animation.clone();
            match existing {
                Some(animation) => animation.retarget(target),
                None => {
                    let from = camera.camera_state();
                    let specs = plan_transition(&from, target, max_duration);
                    let animation = Rc::new(TransitionAnimation::new(&camera, from, &specs));
                    tracked.borrow_mut().animation = Some(animation.clone());
                    let done = Rc::downgrade(&tracked);
                    animation.start(move |success| {
                        if let Some(run) = done.upgrade() {
                            finish(&run, success);
                        }
                    });
                }
            }
            !tracked.borrow().finished
        }));

        if run.borrow().finished {
            let mut observation = observation;
            observation.cancel();
        } else {
            run.borrow_mut().observation = Some(observation);
        }

        Cancelable::new(move || {
            let (observation, animation) = {
                let mut r = run.borrow_mut();
                (r.observation.take(), r.animation.clone())
            };
            if let Some(mut observation) = observation {
                observation.cancel();
            }
            if let Some(animation) = animation {
                animation.cancel();
            }
        })
    }
}

/// Stop observing, release the animators and report once.
fn finish(run: &Rc<RefCell<Run>>, success: bool) {
    let (observation, completion) = {
        let mut r = run.borrow_mut();
        if r.finished {
            return;
        }
        r.finished = true;
        r.animation = None;
        (r.observation.take(), r.completion.take())
    };
    if let Some(mut observation) = observation {
        observation.cancel();
    }
    debug!("default transition finished (success: {success})");
    if let Some(completion) = completion {
        completion(success);
    }
}

struct Component {
    component: CameraComponent,
    animator: SimpleAnimator,
    delay: f64,
}

/// Group of component animators reported as one.
struct TransitionAnimation {
    components: Vec<Component>,
    remaining: Cell<usize>,
    all_ended: Cell<bool>,
}

impl TransitionAnimation {
    fn new(camera: &CameraAnimations, from: CameraState, specs: &[AnimationSpec]) -> Self {
        let components = specs
            .iter()
            .map(|spec| Component {
                component: spec.component,
                animator: camera.make_simple_animator(
                    from,
                    spec.options,
                    spec.duration,
                    TimingCurve::EASE_IN_OUT,
                    AnimationOwner::DEFAULT_VIEWPORT_TRANSITION,
                ),
                delay: spec.delay,
            })
            .collect::<Vec<_>>();
        Self {
            remaining: Cell::new(components.len()),
            all_ended: Cell::new(true),
            components,
        }
    }

    /// Start every component; `on_done` runs once, after the last one
    /// finishes, with `true` when all of them reached the end.
    fn start(self: &Rc<Self>, on_done: impl FnOnce(bool) + 'static) {
        if self.components.is_empty() {
            on_done(true);
            return;
        }
        let on_done: Rc<RefCell<Option<Box<dyn FnOnce(bool)>>>> =
            Rc::new(RefCell::new(Some(Box::new(on_done))));
        for component in &self.components {
            let group = Rc::downgrade(self);
            let on_done = on_done.clone();
            component.animator.handle.add_completion(move |position| {
                let Some(group) = group.upgrade() else {
                    return;
                };
                if position != AnimatingPosition::End {
                    group.all_ended.set(false);
                }
                group.remaining.set(group.remaining.get().saturating_sub(1));
                if group.remaining.get() == 0 {
                    let callback = on_done.borrow_mut().take();
                    if let Some(callback) = callback {
                        callback(group.all_ended.get());
                    }
                }
            });
        }
        for component in &self.components {
            component.animator.handle.start_animation_after_delay(component.delay);
        }
    }

    /// Move every component's destination to the matching field of `target`.
    fn retarget(&self, target: &CameraOptions) {
        for component in &self.components {
            if let Some(options) = component.component.select(target) {
                component.animator.target.set(options);
            }
        }
    }

    fn cancel(&self) {
        for component in &self.components {
            component.animator.handle.stop_animation();
        }
    }
}
