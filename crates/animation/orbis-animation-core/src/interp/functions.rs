//! Interpolation helpers:
//! - lerp / wrap (scalar blend and modular wrap)
//! - interpolate_direction (shortest heading path, result in [0, 360))
//! - interpolate_longitude (shortest antimeridian-aware path, result in [-180, 180))
//! - interpolate_camera_options (field-wise, only fields present on both ends)

use crate::camera::{CameraOptions, Coordinate, EdgeInsets};

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Wrap `value` into `[min, max)`.
#[inline]
pub fn wrap(value: f64, min: f64, max: f64) -> f64 {
    let d = max - min;
    let w = (value - min).rem_euclid(d) + min;
    // rem_euclid may round up to exactly `d` for tiny negative inputs
    if w >= max {
        min
    } else {
        w
    }
}

/// Signed angular difference `to - from` in degrees, in (-180, 180].
#[inline]
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    let d = wrap(to - from, -180.0, 180.0);
    if d == -180.0 {
        180.0
    } else {
        d
    }
}

/// Heading blend that never turns more than half a circle. Result is in [0, 360).
#[inline]
pub fn interpolate_direction(from: f64, to: f64, t: f64) -> f64 {
    wrap(from + shortest_angle_delta(from, to) * t, 0.0, 360.0)
}

/// Longitude blend that crosses the antimeridian when that is shorter.
/// Result is in [-180, 180).
#[inline]
pub fn interpolate_longitude(from: f64, to: f64, t: f64) -> f64 {
    wrap(from + shortest_angle_delta(from, to) * t, -180.0, 180.0)
}

#[inline]
pub fn interpolate_coordinate(from: Coordinate, to: Coordinate, t: f64) -> Coordinate {
    Coordinate {
        latitude: lerp(from.latitude, to.latitude, t),
        longitude: interpolate_longitude(from.longitude, to.longitude, t),
    }
}

#[inline]
pub fn interpolate_insets(from: EdgeInsets, to: EdgeInsets, t: f64) -> EdgeInsets {
    EdgeInsets {
        top: lerp(from.top, to.top, t),
        left: lerp(from.left, to.left, t),
        bottom: lerp(from.bottom, to.bottom, t),
        right: lerp(from.right, to.right, t),
    }
}

/// Blend two partial camera updates. A field appears in the result only when
/// both `from` and `to` carry it; `anchor` is taken from `to` unchanged.
pub fn interpolate_camera_options(
    from: &CameraOptions,
    to: &CameraOptions,
    t: f64,
) -> CameraOptions {
    fn both<T: Copy>(a: Option<T>, b: Option<T>, f: impl Fn(T, T) -> T) -> Option<T> {
        match (a, b) {
            (Some(a), Some(b)) => Some(f(a, b)),
            _ => None,
        }
    }

    CameraOptions {
        center: both(from.center, to.center, |a, b| interpolate_coordinate(a, b, t)),
        padding: both(from.padding, to.padding, |a, b| interpolate_insets(a, b, t)),
        anchor: to.anchor,
        zoom: both(from.zoom, to.zoom, |a, b| lerp(a, b, t)),
        bearing: both(from.bearing, to.bearing, |a, b| interpolate_direction(a, b, t)),
        pitch: both(from.pitch, to.pitch, |a, b| lerp(a, b, t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn wrap_ranges() {
        assert_eq!(wrap(370.0, 0.0, 360.0), 10.0);
        assert_eq!(wrap(-10.0, 0.0, 360.0), 350.0);
        assert_eq!(wrap(180.0, -180.0, 180.0), -180.0);
        assert_eq!(wrap(-180.0, -180.0, 180.0), -180.0);
        assert_eq!(wrap(-1e-18, 0.0, 360.0), 0.0);
    }

    #[test]
    fn shortest_delta_sign() {
        assert_eq!(shortest_angle_delta(350.0, 10.0), 20.0);
        assert_eq!(shortest_angle_delta(10.0, 350.0), -20.0);
        assert_eq!(shortest_angle_delta(0.0, 180.0), 180.0);
        assert_eq!(shortest_angle_delta(180.0, 0.0), 180.0);
    }

    #[test]
    fn bearing_350_to_10_never_crosses_180() {
        for i in 1..100 {
            let t = i as f64 / 100.0;
            let b = interpolate_direction(350.0, 10.0, t);
            assert!(b > 350.0 || b < 10.0, "t={t} bearing={b}");
        }
        assert!(approx(interpolate_direction(350.0, 10.0, 1.0), 10.0, 1e-12));
        assert_eq!(interpolate_direction(350.0, 10.0, 0.0), 350.0);
    }

    #[test]
    fn longitude_crosses_antimeridian() {
        let mid = interpolate_longitude(170.0, -170.0, 0.5);
        assert!(approx(mid, -180.0, 1e-9));
        let q = interpolate_longitude(170.0, -170.0, 0.25);
        assert!(approx(q, 175.0, 1e-9));
    }

    #[test]
    fn options_blend_only_shared_fields() {
        let from = CameraOptions {
            zoom: Some(2.0),
            bearing: Some(0.0),
            pitch: Some(10.0),
            ..Default::default()
        };
        let to = CameraOptions {
            zoom: Some(4.0),
            bearing: Some(90.0),
            center: Some(Coordinate::new(1.0, 1.0)),
            ..Default::default()
        };
        let out = interpolate_camera_options(&from, &to, 0.5);
        assert_eq!(out.zoom, Some(3.0));
        assert_eq!(out.bearing, Some(45.0));
        assert_eq!(out.pitch, None);
        assert_eq!(out.center, None);
    }
}
