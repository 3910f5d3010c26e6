//! Per-component timing of the default transition.
//!
//! Zooming in, the camera pans first, zooms once the pan is half done, and
//! settles bearing with the end of the zoom; pitch and padding land just
//! after. Zooming out, every component moves together for one second.

use orbis_animation_core::projection::{project, zoom_scale};
use orbis_animation_core::{CameraOptions, CameraState};
use serde::{Deserialize, Serialize};

const CENTER_POINTS_PER_SECOND: f64 = 500.0;
const MAX_CENTER_DURATION: f64 = 3.0;
const ZOOM_LEVELS_PER_SECOND: f64 = 2.2;
const MAX_ZOOM_DURATION: f64 = 3.0;
const BEARING_DURATION: f64 = 1.8;
const PITCH_DURATION: f64 = 1.2;
const PADDING_DURATION: f64 = 1.2;
/// Pitch and padding land this long after the zoom.
const SETTLE_LAG: f64 = 0.1;
const ZOOM_OUT_DURATION: f64 = 1.0;

/// Camera field animated by one animator of the default transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraComponent {
    Center,
    Zoom,
    Bearing,
    Pitch,
    Padding,
}

impl CameraComponent {
    /// `camera` reduced to this component, or `None` when it lacks the field.
    pub fn select(self, camera: &CameraOptions) -> Option<CameraOptions> {
        let mut out = CameraOptions::default();
        match self {
            Self::Center => out.center = Some(camera.center?),
            Self::Zoom => out.zoom = Some(camera.zoom?),
            Self::Bearing => out.bearing = Some(camera.bearing?),
            Self::Pitch => out.pitch = Some(camera.pitch?),
            Self::Padding => out.padding = Some(camera.padding?),
        }
        Some(out)
    }
}

/// One planned component animation. Times are in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSpec {
    pub component: CameraComponent,
    pub options: CameraOptions,
    pub duration: f64,
    pub delay: f64,
}

impl AnimationSpec {
    fn new(component: CameraComponent, options: CameraOptions, duration: f64, delay: f64) -> Self {
        Self {
            component,
            options,
            duration,
            delay,
        }
    }

    pub fn end(&self) -> f64 {
        self.delay + self.duration
    }
}

/// Plan the move from `from` to `to`, in component order center, zoom,
/// bearing, pitch, padding; components absent from `to` are skipped. Plans
/// ending after `max_duration` are compressed uniformly.
pub fn plan_transition(
    from: &CameraState,
    to: &CameraOptions,
    max_duration: f64,
) -> Vec<AnimationSpec> {
    let zooming_in = to.zoom.unwrap_or(from.zoom) >= from.zoom;
    let mut specs = if zooming_in {
        zoom_in_plan(from, to)
    } else {
        zoom_out_plan(to)
    };
    compress(&mut specs, max_duration);
    specs
}

fn zoom_in_plan(from: &CameraState, to: &CameraOptions) -> Vec<AnimationSpec> {
    let mut specs = Vec::with_capacity(5);

    let mut center_duration = None;
    if let Some(options) = CameraComponent::Center.select(to) {
        let duration =
            (screen_distance(from, to) / CENTER_POINTS_PER_SECOND).min(MAX_CENTER_DURATION);
        center_duration = Some(duration);
        specs.push(AnimationSpec::new(CameraComponent::Center, options, duration, 0.0));
    }

    let mut zoom_end = None;
    if let Some(options) = CameraComponent::Zoom.select(to) {
        let levels = (options.zoom.unwrap_or(from.zoom) - from.zoom).abs();
        let duration = (levels / ZOOM_LEVELS_PER_SECOND).min(MAX_ZOOM_DURATION);
        let delay = center_duration.map_or(0.0, |d| d / 2.0);
        zoom_end = Some(delay + duration);
        specs.push(AnimationSpec::new(CameraComponent::Zoom, options, duration, delay));
    }

    let ending_after_zoom =
        |duration: f64, lag: f64| zoom_end.map_or(0.0, |end| (end - duration + lag).max(0.0));
    let trailing = [
        (CameraComponent::Bearing, BEARING_DURATION, 0.0),
        (CameraComponent::Pitch, PITCH_DURATION, SETTLE_LAG),
        (CameraComponent::Padding, PADDING_DURATION, SETTLE_LAG),
    ];
    for (component, duration, lag) in trailing {
        if let Some(options) = component.select(to) {
            let delay = ending_after_zoom(duration, lag);
            specs.push(AnimationSpec::new(component, options, duration, delay));
        }
    }
    specs
}

fn zoom_out_plan(to: &CameraOptions) -> Vec<AnimationSpec> {
    [
        CameraComponent::Center,
        CameraComponent::Zoom,
        CameraComponent::Bearing,
        CameraComponent::Pitch,
        CameraComponent::Padding,
    ]
    .into_iter()
    .filter_map(|component| {
        component
            .select(to)
            .map(|options| AnimationSpec::new(component, options, ZOOM_OUT_DURATION, 0.0))
    })
    .collect()
}

/// Screen points between the current and target centers at the current zoom,
/// across the antimeridian when that is shorter.
fn screen_distance(from: &CameraState, to: &CameraOptions) -> f64 {
    let Some(target) = to.center else {
        return 0.0;
    };
    let scale = zoom_scale(from.zoom);
    let source = from.center.unwrap_for_shortest_path(target);
    project(source, scale).distance(project(target, scale))
}

fn compress(specs: &mut [AnimationSpec], max_duration: f64) {
    let total = specs.iter().map(AnimationSpec::end).fold(0.0, f64::max);
    if total <= max_duration || total <= 0.0 {
        return;
    }
    let factor = max_duration.max(0.0) / total;
    for spec in specs.iter_mut() {
        spec.duration *= factor;
        spec.delay *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_animation_core::{Coordinate, EdgeInsets};

    fn approx(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    fn from_z3() -> CameraState {
        CameraState {
            zoom: 3.0,
            ..Default::default()
        }
    }

    /// 1000 screen points east at zoom 3.
    fn full_target() -> CameraOptions {
        CameraOptions {
            center: Some(Coordinate::new(0.0, 360_000.0 / 4096.0)),
            zoom: Some(7.4),
            bearing: Some(90.0),
            pitch: Some(40.0),
            padding: Some(EdgeInsets::uniform(10.0)),
            anchor: None,
        }
    }

    fn timings(specs: &[AnimationSpec]) -> Vec<(CameraComponent, f64, f64)> {
        specs.iter().map(|s| (s.component, s.duration, s.delay)).collect()
    }

    #[test]
    fn zoom_in_sequences_components() {
        let specs = plan_transition(&from_z3(), &full_target(), 10.0);
        let expected = [
            (CameraComponent::Center, 2.0, 0.0),
            (CameraComponent::Zoom, 2.0, 1.0),
            (CameraComponent::Bearing, 1.8, 1.2),
            (CameraComponent::Pitch, 1.2, 1.9),
            (CameraComponent::Padding, 1.2, 1.9),
        ];
        assert_eq!(specs.len(), expected.len());
        for ((component, duration, delay), spec) in expected.iter().zip(timings(&specs)) {
            assert_eq!(*component, spec.0);
            assert!(
                approx(*duration, spec.1, 1e-9),
                "{component:?} duration {}",
                spec.1
            );
            assert!(
                approx(*delay, spec.2, 1e-9),
                "{component:?} delay {}",
                spec.2
            );
        }
        assert_eq!(specs[1].options.zoom, Some(7.4));
        assert_eq!(specs[1].options.center, None);
    }

    #[test]
    fn long_plans_are_compressed_uniformly() {
        let specs = plan_transition(&from_z3(), &full_target(), 1.55);
        let pitch = &specs[3];
        assert!(approx(pitch.delay, 0.95, 1e-9));
        assert!(approx(pitch.end(), 1.55, 1e-9));
        assert!(approx(specs[0].duration, 1.0, 1e-9));
    }

    #[test]
    fn durations_are_capped() {
        let to = CameraOptions {
            center: Some(Coordinate::new(0.0, 170.0)),
            zoom: Some(20.0),
            ..Default::default()
        };
        let specs = plan_transition(&from_z3(), &to, 100.0);
        assert_eq!(specs[0].duration, 3.0);
        assert_eq!(specs[1].duration, 3.0);
        assert_eq!(specs[1].delay, 1.5);
    }

    #[test]
    fn without_center_zoom_starts_at_once() {
        let to = CameraOptions {
            zoom: Some(5.2),
            bearing: Some(10.0),
            ..Default::default()
        };
        let specs = plan_transition(&from_z3(), &to, 10.0);
        assert_eq!(specs[0].component, CameraComponent::Zoom);
        assert!(approx(specs[0].duration, 1.0, 1e-9));
        assert_eq!(specs[0].delay, 0.0);
        assert_eq!(specs[1].component, CameraComponent::Bearing);
        assert_eq!(specs[1].delay, 0.0);
    }

    #[test]
    fn without_zoom_trailing_components_start_at_once() {
        let to = CameraOptions {
            bearing: Some(10.0),
            pitch: Some(20.0),
            ..Default::default()
        };
        let specs = plan_transition(&from_z3(), &to, 10.0);
        assert_eq!(
            timings(&specs),
            vec![
                (CameraComponent::Bearing, 1.8, 0.0),
                (CameraComponent::Pitch, 1.2, 0.0)
            ]
        );
    }

    #[test]
    fn zoom_out_moves_everything_together() {
        let to = CameraOptions {
            center: Some(Coordinate::new(40.0, 40.0)),
            zoom: Some(1.0),
            pitch: Some(0.0),
            ..Default::default()
        };
        let specs = plan_transition(&from_z3(), &to, 10.0);
        assert_eq!(
            timings(&specs),
            vec![
                (CameraComponent::Center, 1.0, 0.0),
                (CameraComponent::Zoom, 1.0, 0.0),
                (CameraComponent::Pitch, 1.0, 0.0)
            ]
        );
    }

    #[test]
    fn empty_target_plans_nothing() {
        assert!(plan_transition(&from_z3(), &CameraOptions::default(), 3.5).is_empty());
    }
}
