//! Orbis Animation Core (engine-agnostic)
//!
//! Frame-clocked camera animation: timing-curve solving, the animator state
//! machine, the runner that multiplexes animators onto a camera sink, fly-to
//! flight paths and the helpers that blend camera values.
//!
//! Everything here runs on one thread. The host owns the frame clock and calls
//! [`AnimatorRunner::update`] (or [`CameraAnimations::tick`]) once per frame.

pub mod animator;
pub mod camera;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod error;
pub mod flyto;
pub mod ids;
pub mod interp;
pub mod manager;
pub mod projection;
pub mod runner;
pub mod scheduler;
pub mod timing;

// Re-exports for consumers (viewport, hosts)
pub use animator::{
    AnimatingPosition, AnimationOwner, AnimationType, Animator, AnimatorState, AnimatorStatus,
    Finished, Step, StopReason,
};
pub use camera::{
    CameraBounds, CameraOptions, CameraSink, CameraState, Coordinate, CoordinateBounds,
    EdgeInsets, MemorySink, ScreenPoint, ScreenSize, SharedSink,
};
pub use cancel::Cancelable;
pub use clock::{
    EnableGate, FrameClock, ManualFrameClock, ManualTime, NoopFrameClock, SystemTime, TimeProvider,
};
pub use config::{Config, FlyToConfig};
pub use error::AnimationError;
pub use flyto::FlightPath;
pub use ids::{AnimatorId, ListenerId};
pub use manager::{CameraAnimations, Completion, DynamicTarget, SimpleAnimator};
pub use projection::camera_for_coordinates;
pub use runner::{AnimatorHandle, AnimatorInfo, AnimatorRunner, AnimatorStatusEvent, RunnerContext};
pub use scheduler::TaskQueue;
pub use timing::{ControlPoint, TimingCurve, UnitBezier};
