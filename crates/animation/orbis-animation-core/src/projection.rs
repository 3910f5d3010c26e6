//! Spherical Web Mercator helpers in world pixels (512 px tiles).

use crate::camera::{CameraBounds, CameraOptions, Coordinate, EdgeInsets, ScreenPoint, ScreenSize};

pub const TILE_SIZE: f64 = 512.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_604;

/// World width in pixels at the given zoom scale (`2^zoom`).
#[inline]
pub fn world_size(zoom_scale: f64) -> f64 {
    TILE_SIZE * zoom_scale
}

#[inline]
pub fn zoom_scale(zoom: f64) -> f64 {
    zoom.exp2()
}

/// Coordinate to world pixels. Longitudes outside [-180, 180] project beyond
/// the world edges, which keeps unwrapped paths continuous.
pub fn project(coord: Coordinate, zoom_scale: f64) -> ScreenPoint {
    let size = world_size(zoom_scale);
    let lat = coord.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = (180.0 + coord.longitude) / 360.0 * size;
    let y_rad = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    let y = (180.0 - y_rad.to_degrees()) / 360.0 * size;
    ScreenPoint::new(x, y)
}

pub fn unproject(point: ScreenPoint, zoom_scale: f64) -> Coordinate {
    let size = world_size(zoom_scale);
    let longitude = point.x / size * 360.0 - 180.0;
    let y2 = 180.0 - point.y / size * 360.0;
    let latitude = 360.0 / std::f64::consts::PI * y2.to_radians().exp().atan() - 90.0;
    Coordinate::new(latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE), longitude)
}

/// Camera that fits every coordinate inside `size` minus `padding`.
///
/// Bearing and pitch are carried into the result but do not influence the fit.
/// Returns `None` when `coords` is empty.
pub fn camera_for_coordinates(
    coords: &[Coordinate],
    padding: EdgeInsets,
    bearing: Option<f64>,
    pitch: Option<f64>,
    size: ScreenSize,
    bounds: &CameraBounds,
) -> Option<CameraOptions> {
    let first = coords.first()?;
    let p0 = project(*first, 1.0);
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (p0.x, p0.y, p0.x, p0.y);
    for c in &coords[1..] {
        let p = project(*c, 1.0);
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let available = size.inset(&padding);
    let span_w = max_x - min_x;
    let span_h = max_y - min_y;
    let scale_w = if span_w > 0.0 { available.width / span_w } else { f64::INFINITY };
    let scale_h = if span_h > 0.0 { available.height / span_h } else { f64::INFINITY };
    let scale = scale_w.min(scale_h);
    let zoom = if scale.is_finite() && scale > 0.0 {
        bounds.clamp_zoom(scale.log2())
    } else if scale == 0.0 {
        bounds.min_zoom
    } else {
        bounds.max_zoom
    };

    let center = unproject(
        ScreenPoint::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0),
        1.0,
    );

    Some(CameraOptions {
        center: Some(center),
        padding: Some(padding),
        anchor: None,
        zoom: Some(zoom),
        bearing,
        pitch,
    })
}
