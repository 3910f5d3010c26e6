//! Error types for the camera animation core.

use serde::{Deserialize, Serialize};

use crate::ids::AnimatorId;

/// Recoverable failures surfaced by the animation core.
///
/// Interruption of an animation is not an error; it is reported through
/// [`AnimatingPosition::Current`](crate::AnimatingPosition::Current).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Animator is not (or no longer) registered with the runner
    #[error("Unknown animator: {id}")]
    UnknownAnimator { id: AnimatorId },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl AnimationError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::UnknownAnimator { .. } => "runner",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
