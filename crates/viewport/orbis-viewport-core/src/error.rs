//! Error types for the viewport layer.

use orbis_animation_core::AnimationError;

/// Recoverable failures surfaced while configuring viewport states and
/// transitions.
///
/// An interrupted or failed transition is not an error; it is reported as
/// `false` to the transition completion and as
/// [`StatusChangeReason::TransitionFailed`](crate::StatusChangeReason::TransitionFailed)
/// to observers.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ViewportError {
    /// Overview state asked to fit no coordinates
    #[error("Overview geometry has no coordinates")]
    EmptyGeometry,

    /// Options rejected by validation
    #[error("Invalid viewport options: {reason}")]
    InvalidOptions { reason: String },

    /// Failure bubbled up from the animation core
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

impl ViewportError {
    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyGeometry => "geometry",
            Self::InvalidOptions { .. } => "options",
            Self::Animation(inner) => inner.category(),
        }
    }
}

impl From<serde_json::Error> for ViewportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Animation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(ViewportError::EmptyGeometry.category(), "geometry");
        let bad = ViewportError::InvalidOptions {
            reason: "max_duration".into(),
        };
        assert_eq!(bad.category(), "options");
        assert_eq!(bad.to_string(), "Invalid viewport options: max_duration");
    }

    #[test]
    fn test_animation_errors_keep_their_category() {
        let err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let converted: ViewportError = err.into();
        assert_eq!(converted.category(), "serialization");
    }
}
