//! Orbis Viewport Core
//!
//! A second state machine on top of `orbis-animation-core`: the viewport is
//! either idle, running a camera *state* (following a location, framing a
//! region) or running a *transition* towards one. Transitions are
//! asynchronous and interruptible; every outcome reaches the caller as a
//! `bool` completion and reaches observers as a [`StatusChangeReason`].
//!
//! States and transitions are registered with the controller, which gives
//! them identities. Status equality compares those identities, never the
//! configuration behind them.

pub mod config;
pub mod controller;
pub mod error;
pub mod ids;
pub mod state;
pub mod states;
pub mod status;
pub mod transitions;

pub use config::{DefaultTransitionOptions, ViewportConfig, ViewportOptions};
pub use controller::{SharedObserver, ViewportController};
pub use error::ViewportError;
pub use ids::{StateId, TransitionId};
pub use state::{
    CameraHandler, StateRef, TransitionCompletion, TransitionRef, ViewportState, ViewportTransition,
};
pub use states::following::{
    FollowingBearing, FollowingState, FollowingStateOptions, LocationUpdate, FOLLOWING_STATE_OWNER,
};
pub use states::overview::{OverviewState, OverviewStateOptions, OVERVIEW_STATE_OWNER};
pub use status::{StatusChangeReason, ViewportStatus, ViewportStatusObserver};
pub use transitions::default::DefaultTransition;
pub use transitions::immediate::ImmediateTransition;
pub use transitions::plan::{plan_transition, AnimationSpec, CameraComponent};
