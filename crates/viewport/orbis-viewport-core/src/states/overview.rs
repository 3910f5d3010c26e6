//! Overview state: fits a set of coordinates into the viewport.

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use orbis_animation_core::{
    camera_for_coordinates, AnimationOwner, CameraAnimations, CameraOptions, Cancelable, Coordinate,
    EdgeInsets,
};
use serde::{Deserialize, Serialize};

use super::{CameraObservers, CameraUpdates};
use crate::error::ViewportError;
use crate::state::{CameraHandler, ViewportState};

/// Owner of the eases an overview state runs while updating the camera.
pub const OVERVIEW_STATE_OWNER: AnimationOwner =
    AnimationOwner::from_static("overviewViewportState");

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverviewStateOptions {
    /// Coordinates to keep in view.
    pub geometry: Vec<Coordinate>,
    pub padding: EdgeInsets,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
    /// Seconds of each ease towards a recomputed camera. Negative values act as 0.
    pub animation_duration: f64,
}

impl Default for OverviewStateOptions {
    fn default() -> Self {
        Self {
            geometry: Vec::new(),
            padding: EdgeInsets::ZERO,
            bearing: Some(0.0),
            pitch: Some(0.0),
            animation_duration: 1.0,
        }
    }
}

impl OverviewStateOptions {
    pub fn new(geometry: Vec<Coordinate>) -> Self {
        Self {
            geometry,
            ..Default::default()
        }
    }
}

/// Keeps a geometry framed; the camera is recomputed whenever the options change.
pub struct OverviewState {
    camera: CameraAnimations,
    options: Rc<RefCell<OverviewStateOptions>>,
    target: RefCell<CameraOptions>,
    observers: CameraObservers,
    updates: CameraUpdates,
}

impl OverviewState {
    /// # Errors
    /// [`ViewportError::EmptyGeometry`] when there is nothing to fit.
    pub fn new(
        camera: CameraAnimations,
        options: OverviewStateOptions,
    ) -> Result<Self, ViewportError> {
        let target = fit(&camera, &options)?;
        Ok(Self {
            camera,
            options: Rc::new(RefCell::new(options)),
            target: RefCell::new(target),
            observers: CameraObservers::default(),
            updates: CameraUpdates::default(),
        })
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn options(&self) -> OverviewStateOptions {
        self.options.borrow().clone()
    }

    /// Replace the options and publish the recomputed camera. Rejected
    /// options leave the state unchanged.
    pub fn set_options(&self, options: OverviewStateOptions) -> Result<(), ViewportError> {
        let target = fit(&self.camera, &options)?;
        *self.options.borrow_mut() = options;
        *self.target.borrow_mut() = target;
        self.observers.publish(&target);
        Ok(())
    }

    /// Camera currently framing the geometry.
    pub fn current_camera(&self) -> CameraOptions {
        *self.target.borrow()
    }

    pub fn is_updating_camera(&self) -> bool {
        self.updates.is_active()
    }
}

fn fit(
    camera: &CameraAnimations,
    options: &OverviewStateOptions,
) -> Result<CameraOptions, ViewportError> {
    let (size, bounds) = {
        let sink = camera.sink();
        let sink = sink.borrow();
        (sink.size(), sink.camera_bounds())
    };
    let fitted = camera_for_coordinates(
        &options.geometry,
        options.padding,
        options.bearing,
        options.pitch,
        size,
        &bounds,
    );
    fitted.ok_or_else(|| {
        warn!("overview geometry is empty; keeping the previous camera");
        ViewportError::EmptyGeometry
    })
}

impl ViewportState for OverviewState {
    fn observe_data_source(&self, handler: CameraHandler) -> Cancelable {
        self.observers.observe(Some(self.current_camera()), handler)
    }

    fn start_updating_camera(&self) {
        let options = self.options.clone();
        self.updates.start(
            &self.observers,
            Some(self.current_camera()),
            self.camera.clone(),
            OVERVIEW_STATE_OWNER,
            move || options.borrow().animation_duration,
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

    fn setup() -> (CameraAnimations, Rc<RefCell<MemorySink>>) {
        let sink = MemorySink::new(CameraState::default(), ScreenSize::new(512.0, 512.0)).shared();
        let runner = AnimatorRunner::new(
            RunnerContext::new(sink.clone()).with_time(Rc::new(ManualTime::new(0.0))),
        );
        (CameraAnimations::new(runner, Config::default()), sink)
    }

    fn square() -> Vec<Coordinate> {
        vec![Coordinate::new(-10.0, -10.0), Coordinate::new(10.0, 10.0)]
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let (camera, _sink) = setup();
        let err = OverviewState::new(camera.clone(), OverviewStateOptions::default())
            .err()
            .unwrap();
        assert_eq!(err, ViewportError::EmptyGeometry);

        let state = OverviewState::new(camera, OverviewStateOptions::new(square())).unwrap();
        let before = state.current_camera();
        assert!(state.set_options(OverviewStateOptions::default()).is_err());
        assert_eq!(state.current_camera(), before);
        assert_eq!(state.options().geometry.len(), 2);
    }

    #[test]
    fn frames_geometry_with_bearing_and_pitch() {
        let (camera, _sink) = setup();
        let mut options = OverviewStateOptions::new(square());
        options.pitch = Some(30.0);
        let state = OverviewState::new(camera, options).unwrap();
        let target = state.current_camera();
        let center = target.center.unwrap();
        assert!(center.latitude.abs() < 1e-9);
        assert!(center.longitude.abs() < 1e-9);
        assert_eq!(target.bearing, Some(0.0));
        assert_eq!(target.pitch, Some(30.0));
        assert!(target.zoom.unwrap() > 2.0);
    }

    #[test]
    fn option_changes_ease_while_updating() {
        let (camera, sink) = setup();
        let state =
            OverviewState::new(camera.clone(), OverviewStateOptions::new(square())).unwrap();
        state.start_updating_camera();
        camera.tick(1.0);
        let framed = sink.borrow().state;
        assert_eq!(Some(framed.zoom), state.current_camera().zoom);

        let mut wider = OverviewStateOptions::new(vec![
            Coordinate::new(-40.0, -40.0),
            Coordinate::new(40.0, 40.0),
        ]);
        wider.animation_duration = 2.0;
        state.set_options(wider).unwrap();
        assert_eq!(camera.runner().running_ids().len(), 1);
        state.stop_updating_camera();
        assert!(!state.is_updating_camera());
        assert!(camera.runner().running_ids().is_empty());
    }
}
