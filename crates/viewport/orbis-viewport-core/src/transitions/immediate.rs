//! Transition that jumps straight to the target camera.

use std::cell::Cell;
use std::rc::Rc;

use orbis_animation_core::{CameraAnimations, Cancelable};

use crate::state::{StateRef, TransitionCompletion, ViewportTransition};

/// Applies the first camera of the target state in one `set_camera` call
/// and succeeds.
pub struct ImmediateTransition {
    camera: CameraAnimations,
}

impl ImmediateTransition {
    pub fn new(camera: CameraAnimations) -> Self {
        Self { camera }
    }
}

impl ViewportTransition for ImmediateTransition {
    fn run(&self, to: &StateRef, completion: TransitionCompletion) -> Cancelable {
        let sink = self.camera.sink();
        let mut completion = Some(completion);
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        let mut observation = to.state().observe_data_source(Box::new(move |target| {
            sink.borrow_mut().set_camera(target);
            flag.set(true);
            if let Some(completion) = completion.take() {
                completion(true);
            }
            false
        }));
        if done.get() {
            observation.cancel();
            return Cancelable::empty();
        }
        observation
    }
}
