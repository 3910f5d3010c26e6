//! Camera model shared by animators, flight paths and the viewport:
//! - geographic/screen primitives (Coordinate, EdgeInsets, ScreenPoint, ScreenSize)
//! - full snapshots (CameraState) and partial updates (CameraOptions)
//! - limits (CameraBounds, CoordinateBounds)
//! - the CameraSink collaborator that owns the live camera

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::interp::functions::{shortest_angle_delta, wrap};

/// Geographic position in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Same position with longitude wrapped into [-180, 180).
    pub fn wrapped(self) -> Self {
        Self {
            latitude: self.latitude,
            longitude: wrap(self.longitude, -180.0, 180.0),
        }
    }

    /// Shift this longitude by a whole turn so the straight-line distance to
    /// `other` never exceeds half the globe.
    pub fn unwrap_for_shortest_path(self, other: Coordinate) -> Self {
        Self {
            latitude: self.latitude,
            longitude: other.longitude - shortest_angle_delta(self.longitude, other.longitude),
        }
    }
}

/// Insets of the camera's focal area from the viewport edges, in points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub const ZERO: EdgeInsets = EdgeInsets {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub const fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: ScreenPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size remaining after removing `padding`; never negative.
    pub fn inset(self, padding: &EdgeInsets) -> Self {
        Self {
            width: (self.width - padding.left - padding.right).max(0.0),
            height: (self.height - padding.top - padding.bottom).max(0.0),
        }
    }
}

/// Complete camera snapshot as reported by the sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: Coordinate,
    pub padding: EdgeInsets,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl CameraState {
    /// Overlay the fields present in `options`.
    pub fn apply(&self, options: &CameraOptions) -> CameraState {
        CameraState {
            center: options.center.unwrap_or(self.center),
            padding: options.padding.unwrap_or(self.padding),
            zoom: options.zoom.unwrap_or(self.zoom),
            bearing: options.bearing.unwrap_or(self.bearing),
            pitch: options.pitch.unwrap_or(self.pitch),
        }
    }

    pub fn to_options(&self) -> CameraOptions {
        CameraOptions::from(*self)
    }
}

/// Partial camera update; absent fields are left untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraOptions {
    pub center: Option<Coordinate>,
    pub padding: Option<EdgeInsets>,
    /// Screen point that stays fixed while zooming or rotating.
    pub anchor: Option<ScreenPoint>,
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
}

impl CameraOptions {
    pub fn is_empty(&self) -> bool {
        self.center.is_none()
            && self.padding.is_none()
            && self.anchor.is_none()
            && self.zoom.is_none()
            && self.bearing.is_none()
            && self.pitch.is_none()
    }
}

impl From<CameraState> for CameraOptions {
    fn from(state: CameraState) -> Self {
        Self {
            center: Some(state.center),
            padding: Some(state.padding),
            anchor: None,
            zoom: Some(state.zoom),
            bearing: Some(state.bearing),
            pitch: Some(state.pitch),
        }
    }
}

/// Rectangular limit on camera centers. When `southwest.longitude` is greater
/// than `northeast.longitude` the box spans the antimeridian.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinateBounds {
    pub southwest: Coordinate,
    pub northeast: Coordinate,
}

impl CoordinateBounds {
    pub const fn new(southwest: Coordinate, northeast: Coordinate) -> Self {
        Self {
            southwest,
            northeast,
        }
    }

    fn spans_antimeridian(&self) -> bool {
        self.southwest.longitude > self.northeast.longitude
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        let lat_ok =
            coord.latitude >= self.southwest.latitude && coord.latitude <= self.northeast.latitude;
        let lon = wrap(coord.longitude, -180.0, 180.0);
        let lon_ok = if self.spans_antimeridian() {
            lon >= self.southwest.longitude || lon <= self.northeast.longitude
        } else {
            lon >= self.southwest.longitude && lon <= self.northeast.longitude
        };
        lat_ok && lon_ok
    }

    /// Nearest coordinate inside the bounds.
    pub fn clamp(&self, coord: Coordinate) -> Coordinate {
        let latitude = coord
            .latitude
            .clamp(self.southwest.latitude, self.northeast.latitude);
        let lon = wrap(coord.longitude, -180.0, 180.0);
        let inside = if self.spans_antimeridian() {
            lon >= self.southwest.longitude || lon <= self.northeast.longitude
        } else {
            lon >= self.southwest.longitude && lon <= self.northeast.longitude
        };
        let longitude = if inside {
            lon
        } else {
            let to_west = angular_gap(lon, self.southwest.longitude);
            let to_east = angular_gap(lon, self.northeast.longitude);
            if to_west <= to_east {
                self.southwest.longitude
            } else {
                self.northeast.longitude
            }
        };
        Coordinate {
            latitude,
            longitude,
        }
    }
}

fn angular_gap(a: f64, b: f64) -> f64 {
    let d = wrap(b - a, -180.0, 180.0);
    d.abs()
}

/// Limits the sink enforces on camera values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraBounds {
    pub bounds: Option<CoordinateBounds>,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub min_pitch: f64,
    pub max_pitch: f64,
}

impl Default for CameraBounds {
    fn default() -> Self {
        Self {
            bounds: None,
            min_zoom: 0.0,
            max_zoom: 22.0,
            min_pitch: 0.0,
            max_pitch: 85.0,
        }
    }
}

impl CameraBounds {
    #[inline]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    #[inline]
    pub fn clamp_pitch(&self, pitch: f64) -> f64 {
        pitch.clamp(self.min_pitch, self.max_pitch)
    }

    pub fn clamp_center(&self, center: Coordinate) -> Coordinate {
        match &self.bounds {
            Some(b) => b.clamp(center),
            None => center,
        }
    }
}

/// The live camera. Implemented by the host map; the core only reads
/// snapshots from it and pushes partial updates into it.
pub trait CameraSink {
    fn camera_state(&self) -> CameraState;

    fn size(&self) -> ScreenSize;

    fn camera_bounds(&self) -> CameraBounds {
        CameraBounds::default()
    }

    fn set_camera(&mut self, options: &CameraOptions);

    /// First animator entered `Running`.
    fn begin_animation(&mut self) {}

    /// Last running animator left `Running`.
    fn end_animation(&mut self) {}
}

/// Sink handle shared by the runner, the animation manager and viewport states.
pub type SharedSink = Rc<RefCell<dyn CameraSink>>;

/// Headless sink that stores the camera in memory and counts what it receives.
#[derive(Clone, Debug)]
pub struct MemorySink {
    pub state: CameraState,
    pub size: ScreenSize,
    pub bounds: CameraBounds,
    pub set_camera_calls: usize,
    pub sessions_begun: usize,
    pub sessions_ended: usize,
}

impl MemorySink {
    pub fn new(state: CameraState, size: ScreenSize) -> Self {
        Self {
            state,
            size,
            bounds: CameraBounds::default(),
            set_camera_calls: 0,
            sessions_begun: 0,
            sessions_ended: 0,
        }
    }

    pub fn shared(self) -> Rc<RefCell<MemorySink>> {
        Rc::new(RefCell::new(self))
    }
}

impl CameraSink for MemorySink {
    fn camera_state(&self) -> CameraState {
        self.state
    }

    fn size(&self) -> ScreenSize {
        self.size
    }

    fn camera_bounds(&self) -> CameraBounds {
        self.bounds
    }

    fn set_camera(&mut self, options: &CameraOptions) {
        let mut next = self.state.apply(options);
        next.center = self.bounds.clamp_center(next.center.wrapped());
        next.zoom = self.bounds.clamp_zoom(next.zoom);
        next.pitch = self.bounds.clamp_pitch(next.pitch);
        self.state = next;
        self.set_camera_calls += 1;
    }

    fn begin_animation(&mut self) {
        self.sessions_begun += 1;
    }

    fn end_animation(&mut self) {
        self.sessions_ended += 1;
    }
}
