//! Core configuration for orbis-animation-core.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Engine-wide tuning knobs. Every field has a default so partial JSON is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tolerance handed to the timing-curve solver on every frame.
    pub solver_epsilon: f64,

    /// Flight path shaping for fly-to animations.
    pub fly_to: FlyToConfig,

    /// Initial value of the runner's enable gate.
    pub starts_enabled: bool,
}

/// Parameters of the zoom-out-then-in flight curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyToConfig {
    /// Ratio of zooming to panning; larger values zoom out further mid-flight.
    pub rho: f64,
    /// Average speed in screenfuls per second used for the default duration.
    pub velocity: f64,
    /// Lower bound of the default duration in seconds.
    pub min_duration: f64,
    /// Upper bound of the default duration in seconds.
    pub max_duration: f64,
}

impl Default for FlyToConfig {
    fn default() -> Self {
        Self {
            rho: 1.42,
            velocity: 1.2,
            min_duration: 0.25,
            max_duration: 8.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver_epsilon: 1e-6,
            fly_to: FlyToConfig::default(),
            starts_enabled: true,
        }
    }
}

impl Config {
    /// Parse a JSON document and validate the result.
    pub fn from_json(json: &str) -> Result<Self, AnimationError> {
        let cfg: Config = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AnimationError> {
        if !(self.solver_epsilon.is_finite() && self.solver_epsilon > 0.0) {
            return Err(invalid(format!(
                "solver_epsilon must be positive, got {}",
                self.solver_epsilon
            )));
        }
        self.fly_to.validate()
    }
}

impl FlyToConfig {
    pub fn validate(&self) -> Result<(), AnimationError> {
        if !(self.rho.is_finite() && self.rho > 0.0) {
            return Err(invalid(format!("fly_to.rho must be positive, got {}", self.rho)));
        }
        if !(self.velocity.is_finite() && self.velocity > 0.0) {
            return Err(invalid(format!(
                "fly_to.velocity must be positive, got {}",
                self.velocity
            )));
        }
        if !(self.min_duration >= 0.0 && self.min_duration <= self.max_duration) {
            return Err(invalid(format!(
                "fly_to duration envelope [{}, {}] is inverted",
                self.min_duration, self.max_duration
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> AnimationError {
    AnimationError::InvalidConfig { reason }
}
