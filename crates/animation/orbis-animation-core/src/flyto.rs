//! Fly-to flight paths.
//!
//! Implements the "optimal path" zoom-and-pan curve of van Wijk & Nuij,
//! "Smooth and efficient zooming and panning" (INFOVIS '03). Long moves zoom
//! out so both endpoints fit on screen mid-flight; short moves blend zoom
//! monotonically. Bearing, pitch and padding blend linearly, bearing along
//! the shorter arc.
//!
//! A [`FlightPath`] is immutable once built; sampling it never touches the
//! camera. An animator drives it by calling [`FlightPath::at`] from its
//! per-frame callback.

use crate::camera::{CameraBounds, CameraOptions, CameraState, EdgeInsets, ScreenPoint, ScreenSize};
use crate::config::FlyToConfig;
use crate::interp::functions::{interpolate_insets, lerp, shortest_angle_delta, wrap};
use crate::projection::{project, unproject, zoom_scale};

/// Precomputed flight between two cameras.
#[derive(Clone, Debug, PartialEq)]
pub struct FlightPath {
    source_zoom: f64,
    source_scale: f64,
    source_point: ScreenPoint,
    dest_point: ScreenPoint,
    source_bearing: f64,
    bearing_delta: f64,
    source_pitch: f64,
    dest_pitch: f64,
    source_padding: EdgeInsets,
    dest_padding: EdgeInsets,
    dest: CameraState,
    shape: Shape,
    rho: f64,
    /// S: total path length in ρ-screenfuls.
    length: f64,
    duration: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    /// Endpoints share a center (or the path degenerates); only zoom moves.
    Close { w_sign: f64 },
    /// Full ascent/descent curve.
    Arc { r0: f64, w0: f64, u1: f64 },
}

impl FlightPath {
    /// Build a flight from `from` to the fields of `to`; absent fields keep their
    /// source value. Destination zoom and pitch are clamped to `bounds`, and the
    /// destination center to `bounds.bounds` when present. The source camera is
    /// taken as-is.
    pub fn new(
        from: &CameraState,
        to: &CameraOptions,
        bounds: &CameraBounds,
        size: ScreenSize,
        cfg: &FlyToConfig,
    ) -> Self {
        let source_zoom = from.zoom;
        let source_scale = zoom_scale(source_zoom);

        let dest_padding = to.padding.unwrap_or(from.padding);
        let dest_center = bounds
            .clamp_center(to.center.unwrap_or(from.center))
            .wrapped();
        let dest_zoom = bounds.clamp_zoom(to.zoom.unwrap_or(source_zoom));
        let dest_pitch = bounds.clamp_pitch(to.pitch.unwrap_or(from.pitch));
        let dest_bearing = to.bearing.unwrap_or(from.bearing);

        let source_center = from.center.unwrap_for_shortest_path(dest_center);
        let source_point = project(source_center, source_scale);
        let dest_point = project(dest_center, source_scale);

        // w0: visible span at the start, one "screenful".
        let padded = size.inset(&dest_padding);
        let mut w0 = padded.width.max(padded.height);
        if !(w0 > 0.0) {
            w0 = size.width.max(size.height);
        }
        if !(w0 > 0.0) {
            w0 = 1.0;
        }
        // w1: visible span at the end, measured at the start scale.
        let w1 = w0 / (dest_zoom - source_zoom).exp2();
        // u1: ground distance in pixels at the start scale.
        let u1 = source_point.distance(dest_point);

        let rho = cfg.rho;
        let rho2 = rho * rho;
        let r = |i: u8| -> f64 {
            let sign = if i == 0 { 1.0 } else { -1.0 };
            let w_i = if i == 0 { w0 } else { w1 };
            let b = (w1 * w1 - w0 * w0 + sign * rho2 * rho2 * u1 * u1) / (2.0 * w_i * rho2 * u1);
            ((b * b + 1.0).sqrt() - b).ln()
        };
        let (r0, r1) = if u1 != 0.0 {
            (r(0), r(1))
        } else {
            (f64::INFINITY, f64::INFINITY)
        };

        let is_close = u1.abs() < 1e-6 || !r0.is_finite() || !r1.is_finite();
        let (shape, length) = if is_close {
            let w_sign = if w1 < w0 { -1.0 } else { 1.0 };
            (Shape::Close { w_sign }, (w1 / w0).ln().abs() / rho)
        } else {
            (Shape::Arc { r0, w0, u1 }, (r1 - r0) / rho)
        };

        let raw = length / cfg.velocity;
        let duration = if raw.is_finite() {
            raw.clamp(cfg.min_duration, cfg.max_duration)
        } else {
            log::warn!("fly-to produced a non-finite duration; using the maximum");
            cfg.max_duration
        };

        Self {
            source_zoom,
            source_scale,
            source_point,
            dest_point,
            source_bearing: from.bearing,
            bearing_delta: shortest_angle_delta(from.bearing, dest_bearing),
            source_pitch: from.pitch,
            dest_pitch,
            source_padding: from.padding,
            dest_padding,
            dest: CameraState {
                center: dest_center,
                padding: dest_padding,
                zoom: dest_zoom,
                bearing: wrap(dest_bearing, 0.0, 360.0),
                pitch: dest_pitch,
            },
            shape,
            rho,
            length,
            duration,
        }
    }

    /// Suggested animation length in seconds, inside the configured envelope.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Total path length in ρ-screenfuls.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Camera at the clamped destination.
    pub fn destination(&self) -> CameraState {
        self.dest
    }

    /// w(s): visible span relative to the start.
    fn span(&self, s: f64) -> f64 {
        match self.shape {
            Shape::Close { w_sign } => (w_sign * self.rho * s).exp(),
            Shape::Arc { r0, .. } => r0.cosh() / (r0 + self.rho * s).cosh(),
        }
    }

    /// u(s): fraction of the ground distance covered.
    fn progress(&self, s: f64) -> f64 {
        match self.shape {
            Shape::Close { .. } => 0.0,
            Shape::Arc { r0, w0, u1 } => {
                let rho2 = self.rho * self.rho;
                w0 * (r0.cosh() * (r0 + self.rho * s).tanh() - r0.sinh()) / rho2 / u1
            }
        }
    }

    /// Camera at `fraction` of the way along the path. Fractions at or past 1
    /// return the destination exactly; at or below 0 the source.
    pub fn at(&self, fraction: f64) -> CameraState {
        if fraction >= 1.0 {
            return self.dest;
        }
        let f = fraction.max(0.0);
        let s = f * self.length;

        let u = self.progress(s);
        let point = ScreenPoint::new(
            lerp(self.source_point.x, self.dest_point.x, u),
            lerp(self.source_point.y, self.dest_point.y, u),
        );
        let center = unproject(point, self.source_scale).wrapped();

        let zoom = self.source_zoom + (1.0 / self.span(s)).log2();

        CameraState {
            center,
            padding: interpolate_insets(self.source_padding, self.dest_padding, f),
            zoom,
            bearing: wrap(self.source_bearing + self.bearing_delta * f, 0.0, 360.0),
            pitch: lerp(self.source_pitch, self.dest_pitch, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Coordinate;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn state(lat: f64, lon: f64, zoom: f64) -> CameraState {
        CameraState {
            center: Coordinate::new(lat, lon),
            zoom,
            ..Default::default()
        }
    }

    fn size() -> ScreenSize {
        ScreenSize::new(800.0, 600.0)
    }

    fn flight(from: &CameraState, to: &CameraOptions) -> FlightPath {
        FlightPath::new(
            from,
            to,
            &CameraBounds::default(),
            size(),
            &FlyToConfig::default(),
        )
    }

    #[test]
    fn endpoints_match() {
        let from = state(10.0, 20.0, 3.0);
        let to = CameraOptions {
            center: Some(Coordinate::new(40.0, -70.0)),
            zoom: Some(6.0),
            bearing: Some(90.0),
            pitch: Some(30.0),
            ..Default::default()
        };
        let path = flight(&from, &to);
        let start = path.at(0.0);
        assert!(approx(start.center.latitude, 10.0, 1e-9));
        assert!(approx(start.center.longitude, 20.0, 1e-9));
        assert!(approx(start.zoom, 3.0, 1e-9));
        let end = path.at(1.0);
        assert_eq!(end.center, Coordinate::new(40.0, -70.0));
        assert_eq!(end.zoom, 6.0);
        assert_eq!(end.bearing, 90.0);
        assert_eq!(end.pitch, 30.0);
    }

    #[test]
    fn long_flight_zooms_out_midway() {
        let from = state(0.0, 0.0, 10.0);
        let to = CameraOptions {
            center: Some(Coordinate::new(0.0, 60.0)),
            zoom: Some(10.0),
            ..Default::default()
        };
        let path = flight(&from, &to);
        assert!(path.at(0.5).zoom < 9.0);
    }

    #[test]
    fn same_center_zooms_monotonically() {
        let from = state(0.0, 0.0, 2.0);
        let to = CameraOptions {
            zoom: Some(8.0),
            ..Default::default()
        };
        let path = flight(&from, &to);
        let mut last = path.at(0.0).zoom;
        for i in 1..=20 {
            let z = path.at(i as f64 / 20.0).zoom;
            assert!(z >= last - 1e-9);
            last = z;
        }
        assert_eq!(last, 8.0);
    }

    #[test]
    fn duration_is_bounded() {
        let cfg = FlyToConfig::default();
        let from = state(0.0, 0.0, 5.0);
        let same = FlightPath::new(
            &from,
            &CameraOptions::default(),
            &CameraBounds::default(),
            size(),
            &cfg,
        );
        assert_eq!(same.duration(), cfg.min_duration);

        let far = FlightPath::new(
            &state(0.0, 0.0, 18.0),
            &CameraOptions {
                center: Some(Coordinate::new(40.0, 120.0)),
                ..Default::default()
            },
            &CameraBounds::default(),
            size(),
            &cfg,
        );
        assert!(far.duration() <= cfg.max_duration);
        assert!(far.duration() > cfg.min_duration);
    }

    #[test]
    fn destination_is_clamped() {
        let bounds = CameraBounds {
            max_zoom: 12.0,
            max_pitch: 60.0,
            ..Default::default()
        };
        let to = CameraOptions {
            zoom: Some(20.0),
            pitch: Some(80.0),
            ..Default::default()
        };
        let path = FlightPath::new(
            &state(0.0, 0.0, 1.0),
            &to,
            &bounds,
            size(),
            &FlyToConfig::default(),
        );
        assert_eq!(path.destination().zoom, 12.0);
        assert_eq!(path.destination().pitch, 60.0);
    }

    #[test]
    fn zero_viewport_still_samples() {
        let path = FlightPath::new(
            &state(0.0, 0.0, 1.0),
            &CameraOptions {
                center: Some(Coordinate::new(10.0, 10.0)),
                ..Default::default()
            },
            &CameraBounds::default(),
            ScreenSize::new(0.0, 0.0),
            &FlyToConfig::default(),
        );
        let mid = path.at(0.5);
        assert!(mid.zoom.is_finite());
        assert!(mid.center.latitude.is_finite());
    }
}
