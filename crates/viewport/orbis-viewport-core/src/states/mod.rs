//! Built-in viewport states.

pub mod following;
pub mod overview;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::debug;
use orbis_animation_core::{
    AnimationOwner, AnimatorHandle, CameraAnimations, CameraOptions, Cancelable, TimingCurve,
};

use crate::state::CameraHandler;

struct Entry {
    alive: Cell<bool>,
    handler: RefCell<Option<CameraHandler>>,
}

/// Data-source fan-out shared by the built-in states. Handlers may cancel
/// themselves, or register new handlers, while a camera is being published.
#[derive(Default)]
pub(crate) struct CameraObservers {
    entries: Rc<RefCell<Vec<Rc<Entry>>>>,
}

impl CameraObservers {
    /// Register `handler`, feeding it `current` first when known.
    pub(crate) fn observe(
        &self,
        current: Option<CameraOptions>,
        mut handler: CameraHandler,
    ) -> Cancelable {
        if let Some(camera) = current {
            if !handler(&camera) {
                return Cancelable::empty();
            }
        }
        let entry = Rc::new(Entry {
            alive: Cell::new(true),
            handler: RefCell::new(Some(handler)),
        });
        self.entries.borrow_mut().push(entry.clone());

        let entries = Rc::downgrade(&self.entries);
        Cancelable::new(move || {
            entry.alive.set(false);
            let dropped = entry.handler.borrow_mut().take();
            drop(dropped);
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().retain(|e| !Rc::ptr_eq(e, &entry));
            }
        })
    }

    pub(crate) fn publish(&self, camera: &CameraOptions) {
        let snapshot = self.entries.borrow().clone();
        for entry in snapshot {
            if !entry.alive.get() {
                continue;
            }
            let taken = entry.handler.borrow_mut().take();
            let Some(mut handler) = taken else {
                continue;
            };
            if handler(camera) && entry.alive.get() {
                *entry.handler.borrow_mut() = Some(handler);
            } else {
                entry.alive.set(false);
            }
        }
        self.entries.borrow_mut().retain(|e| e.alive.get());
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Live "updating the camera" session of a state: an observation of the
/// state's own cameras that eases to each one linearly.
#[derive(Default)]
pub(crate) struct CameraUpdates {
    active: RefCell<Option<Session>>,
}

struct Session {
    observation: Cancelable,
    animation: Rc<RefCell<Option<AnimatorHandle>>>,
}

impl CameraUpdates {
    /// No-op while a session is already active.
    pub(crate) fn start(
        &self,
        observers: &CameraObservers,
        current: Option<CameraOptions>,
        camera: CameraAnimations,
        owner: AnimationOwner,
        duration: impl Fn() -> f64 + 'static,
    ) {
        if self.active.borrow().is_some() {
            return;
        }
        debug!("{owner} starts updating the camera");
        let animation: Rc<RefCell<Option<AnimatorHandle>>> = Rc::new(RefCell::new(None));
        let slot = animation.clone();
        let observation = observers.observe(
            current,
            Box::new(move |target| {
                let handle = camera.ease_to(
                    *target,
                    duration().max(0.0),
                    TimingCurve::LINEAR,
                    owner.clone(),
                    None,
                );
                *slot.borrow_mut() = Some(handle);
                true
            }),
        );
        *self.active.borrow_mut() = Some(Session {
            observation,
            animation,
        });
    }

    pub(crate) fn stop(&self) {
        let session = self.active.borrow_mut().take();
        let Some(mut session) = session else {
            return;
        };
        session.observation.cancel();
        let running = session.animation.borrow_mut().take();
        if let Some(handle) = running {
            handle.stop_animation();
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom(z: f64) -> CameraOptions {
        CameraOptions {
            zoom: Some(z),
            ..Default::default()
        }
    }

    #[test]
    fn current_camera_is_delivered_first() {
        let observers = CameraObservers::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        let _token = observers.observe(
            Some(zoom(1.0)),
            Box::new(move |c| {
                s.borrow_mut().push(c.zoom);
                true
            }),
        );
        observers.publish(&zoom(2.0));
        assert_eq!(*seen.borrow(), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn returning_false_unsubscribes() {
        let observers = CameraObservers::default();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _token = observers.observe(
            None,
            Box::new(move |_| {
                h.set(h.get() + 1);
                false
            }),
        );
        observers.publish(&zoom(1.0));
        observers.publish(&zoom(2.0));
        assert_eq!(hits.get(), 1);
        assert_eq!(observers.len(), 0);

        let early = observers.observe(Some(zoom(3.0)), Box::new(|_| false));
        assert!(!early.is_armed());
        assert_eq!(observers.len(), 0);
    }

    #[test]
    fn cancel_stops_delivery() {
        let observers = CameraObservers::default();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let mut token = observers.observe(
            None,
            Box::new(move |_| {
                h.set(h.get() + 1);
                true
            }),
        );
        observers.publish(&zoom(1.0));
        token.cancel();
        observers.publish(&zoom(2.0));
        assert_eq!(hits.get(), 1);
        assert_eq!(observers.len(), 0);
    }

    #[test]
    fn handler_cancelled_mid_publish_stays_cancelled() {
        let observers = CameraObservers::default();
        let token: Rc<RefCell<Option<Cancelable>>> = Rc::new(RefCell::new(None));
        let t = token.clone();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let registered = observers.observe(
            None,
            Box::new(move |_| {
                h.set(h.get() + 1);
                let taken = t.borrow_mut().take();
                if let Some(mut c) = taken {
                    c.cancel();
                }
                true
            }),
        );
        *token.borrow_mut() = Some(registered);
        observers.publish(&zoom(1.0));
        observers.publish(&zoom(2.0));
        assert_eq!(hits.get(), 1);
    }
}
