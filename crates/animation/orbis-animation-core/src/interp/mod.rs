//! Interpolation helpers for camera values.
//!
//! Scalars blend linearly; headings and longitudes take the short way around
//! the circle; partial camera updates blend only the fields both ends carry.

pub mod functions;

pub use functions::{
    interpolate_camera_options, interpolate_coordinate, interpolate_direction,
    interpolate_insets, interpolate_longitude, lerp, shortest_angle_delta, wrap,
};
