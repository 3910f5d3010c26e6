//! Following state: keeps the camera on a moving location.

use std::cell::RefCell;
use std::rc::Rc;

use orbis_animation_core::{
    AnimationOwner, CameraAnimations, CameraOptions, Cancelable, Coordinate, EdgeInsets,
};
use serde::{Deserialize, Serialize};

use super::{CameraObservers, CameraUpdates};
use crate::error::ViewportError;
use crate::state::{CameraHandler, ViewportState};

/// Owner of the eases a following state runs while updating the camera.
pub const FOLLOWING_STATE_OWNER: AnimationOwner =
    AnimationOwner::from_static("followingViewportState");

/// Seconds each ease towards a new location takes.
const FOLLOW_EASE_DURATION: f64 = 1.0;

/// Where the camera points while following.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowingBearing {
    /// Fixed bearing in degrees.
    Constant(f64),
    /// Device heading of the latest location.
    Heading,
    /// Direction of travel of the latest location.
    Course,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowingStateOptions {
    pub padding: EdgeInsets,
    pub zoom: f64,
    pub bearing: FollowingBearing,
    pub pitch: f64,
}

impl Default for FollowingStateOptions {
    fn default() -> Self {
        Self {
            padding: EdgeInsets::ZERO,
            zoom: 16.35,
            bearing: FollowingBearing::Heading,
            pitch: 45.0,
        }
    }
}

impl FollowingStateOptions {
    pub fn validate(&self) -> Result<(), ViewportError> {
        let invalid = |reason: String| -> Result<(), ViewportError> {
            Err(ViewportError::InvalidOptions { reason })
        };
        if !self.zoom.is_finite() {
            return invalid(format!("following.zoom must be finite, got {}", self.zoom));
        }
        if !self.pitch.is_finite() {
            return invalid(format!("following.pitch must be finite, got {}", self.pitch));
        }
        if let FollowingBearing::Constant(b) = self.bearing {
            if !b.is_finite() {
                return invalid(format!("following.bearing must be finite, got {b}"));
            }
        }
        Ok(())
    }

    /// Camera centered on `location`. Heading or course bearings are left
    /// out when the location does not carry them.
    pub fn camera_for(&self, location: &LocationUpdate) -> CameraOptions {
        let bearing = match self.bearing {
            FollowingBearing::Constant(b) => Some(b),
            FollowingBearing::Heading => location.heading,
            FollowingBearing::Course => location.course,
        };
        CameraOptions {
            center: Some(location.coordinate),
            padding: Some(self.padding),
            anchor: None,
            zoom: Some(self.zoom),
            bearing,
            pitch: Some(self.pitch),
        }
    }
}

/// One sample from the location source.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub coordinate: Coordinate,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub course: Option<f64>,
}

impl LocationUpdate {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            heading: None,
            course: None,
        }
    }
}

/// Follows the location fed through [`update_location`](Self::update_location).
pub struct FollowingState {
    camera: CameraAnimations,
    options: RefCell<FollowingStateOptions>,
    location: RefCell<Option<LocationUpdate>>,
    observers: CameraObservers,
    updates: CameraUpdates,
}

impl FollowingState {
    pub fn new(
        camera: CameraAnimations,
        options: FollowingStateOptions,
    ) -> Result<Self, ViewportError> {
        options.validate()?;
        Ok(Self {
            camera,
            options: RefCell::new(options),
            location: RefCell::new(None),
            observers: CameraObservers::default(),
            updates: CameraUpdates::default(),
        })
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn options(&self) -> FollowingStateOptions {
        *self.options.borrow()
    }

    pub fn set_options(&self, options: FollowingStateOptions) -> Result<(), ViewportError> {
        options.validate()?;
        *self.options.borrow_mut() = options;
        if let Some(camera) = self.current_camera() {
            self.observers.publish(&camera);
        }
        Ok(())
    }

    pub fn update_location(&self, location: LocationUpdate) {
        *self.location.borrow_mut() = Some(location);
        let camera = self.options.borrow().camera_for(&location);
        self.observers.publish(&camera);
    }

    /// Target camera for the latest location, if one arrived yet.
    pub fn current_camera(&self) -> Option<CameraOptions> {
        let location = (*self.location.borrow())?;
        Some(self.options.borrow().camera_for(&location))
    }

    pub fn is_updating_camera(&self) -> bool {
        self.updates.is_active()
    }
}

impl ViewportState for FollowingState {
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
        self.observers.observe(self.current_camera(), handler)
    }

    fn start_updating_camera(&self) {
        self.updates.start(
            &self.observers,
            self.current_camera(),
            self.camera.clone(),
            FOLLOWING_STATE_OWNER,
            || FOLLOW_EASE_DURATION,
        );
    }

    fn stop_updating_camera(&self) {
        self.updates.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_animation_core::{
        AnimatorRunner, CameraState, Config, ManualTime, MemorySink, RunnerContext, ScreenSize,
    };
    use std::cell::Cell;

    fn setup() -> (CameraAnimations, Rc<RefCell<MemorySink>>) {
        let sink = MemorySink::new(CameraState::default(), ScreenSize::new(400.0, 400.0)).shared();
        let runner = AnimatorRunner::new(
            RunnerContext::new(sink.clone()).with_time(Rc::new(ManualTime::new(0.0))),
        );
        (CameraAnimations::new(runner, Config::default()), sink)
    }

    #[test]
    fn bearing_sources() {
        let mut location = LocationUpdate::new(Coordinate::new(1.0, 2.0));
        location.heading = Some(90.0);
        location.course = Some(180.0);

        let mut options = FollowingStateOptions::default();
        assert_eq!(options.camera_for(&location).bearing, Some(90.0));
        options.bearing = FollowingBearing::Course;
        assert_eq!(options.camera_for(&location).bearing, Some(180.0));
        options.bearing = FollowingBearing::Constant(12.0);
        assert_eq!(options.camera_for(&location).bearing, Some(12.0));

        options.bearing = FollowingBearing::Heading;
        let bare = LocationUpdate::new(Coordinate::new(1.0, 2.0));
        assert_eq!(options.camera_for(&bare).bearing, None);
        assert_eq!(options.camera_for(&bare).zoom, Some(16.35));
    }

    #[test]
    fn rejects_non_finite_zoom() {
        let (camera, _sink) = setup();
        let options = FollowingStateOptions {
            zoom: f64::NAN,
            ..Default::default()
        };
        let err = FollowingState::new(camera, options).err().unwrap();
        assert_eq!(err.category(), "options");
    }

    #[test]
    fn no_camera_until_first_location() {
        let (camera, _sink) = setup();
        let state = FollowingState::new(camera, FollowingStateOptions::default()).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let _token = state.observe_data_source(Box::new(move |_| {
            h.set(h.get() + 1);
            true
        }));
        assert_eq!(hits.get(), 0);
        state.update_location(LocationUpdate::new(Coordinate::new(5.0, 5.0)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn updating_eases_towards_each_location() {
        let (camera, sink) = setup();
        let state = FollowingState::new(camera.clone(), FollowingStateOptions::default()).unwrap();
        state.update_location(LocationUpdate::new(Coordinate::new(10.0, 20.0)));
        state.start_updating_camera();
        state.start_updating_camera();
        assert!(state.is_updating_camera());
        assert_eq!(camera.runner().running_ids().len(), 1);

        camera.tick(0.5);
        let halfway = sink.borrow().state;
        assert!((halfway.center.latitude - 5.0).abs() < 1e-6);
        camera.tick(1.0);
        assert_eq!(sink.borrow().state.zoom, 16.35);

        state.update_location(LocationUpdate::new(Coordinate::new(11.0, 20.0)));
        assert_eq!(camera.runner().running_ids().len(), 1);
        state.stop_updating_camera();
        assert!(camera.runner().running_ids().is_empty());

        state.update_location(LocationUpdate::new(Coordinate::new(12.0, 20.0)));
        assert!(camera.runner().running_ids().is_empty());
    }
}
