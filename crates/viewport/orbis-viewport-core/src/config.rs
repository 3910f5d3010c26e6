//! Viewport configuration.

use orbis_animation_core::Config;
use serde::{Deserialize, Serialize};

use crate::error::ViewportError;

/// Controller-wide behavior switches.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportOptions {
    /// Gestures idle the viewport through
    /// [`ViewportController::handle_user_interaction`](crate::ViewportController::handle_user_interaction).
    pub transitions_to_idle_upon_user_interaction: bool,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            transitions_to_idle_upon_user_interaction: true,
        }
    }
}

/// Tuning of [`DefaultTransition`](crate::DefaultTransition).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultTransitionOptions {
    /// Upper bound in seconds; longer plans are scaled down uniformly.
    pub max_duration: f64,
}

impl Default for DefaultTransitionOptions {
    fn default() -> Self {
        Self { max_duration: 3.5 }
    }
}

impl DefaultTransitionOptions {
    pub fn validate(&self) -> Result<(), ViewportError> {
        if !(self.max_duration.is_finite() && self.max_duration >= 0.0) {
            return Err(ViewportError::InvalidOptions {
                reason: format!(
                    "default_transition.max_duration must be non-negative, got {}",
                    self.max_duration
                ),
            });
        }
        Ok(())
    }
}

/// Everything a host needs to stand up a viewport, loadable from one JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub viewport: ViewportOptions,
    pub default_transition: DefaultTransitionOptions,
    pub animation: Config,
}

impl ViewportConfig {
    /// Parse a JSON document and validate every section.
    pub fn from_json(json: &str) -> Result<Self, ViewportError> {
        let cfg: ViewportConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ViewportError> {
        self.animation.validate()?;
        self.default_transition.validate()
    }
}
