//! World construction parameters
//!
//! Loaded from JSON or built from defaults, then validated once before a
//! [`crate::sim::World`] is created.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Parameters fixed for the lifetime of a world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Pixels per meter
    pub scale: f32,
    /// Target frame rate of the external pacing loop (not used by the core)
    pub frames_per_second: f32,
    /// Gravitational acceleration magnitude (m/s²), used by friction and gravity fields
    pub gravity: f32,
    /// Static friction coefficient
    pub mu_s: f32,
    /// Kinetic friction coefficient
    pub mu_k: f32,
    /// Largest timestep a single `step` integrates (seconds)
    pub max_dt: f32,
    /// Speed under which friction treats a body as resting (simulation units)
    pub rest_epsilon: f32,
    /// Velocity components below this are zeroed after contact resolution
    pub stabilize_epsilon: f32,
    /// Substep cap for fixed-timestep drivers
    pub max_substeps: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            frames_per_second: DEFAULT_FPS,
            gravity: STANDARD_GRAVITY,
            mu_s: DEFAULT_MU_S,
            mu_k: DEFAULT_MU_K,
            max_dt: MAX_DT,
            rest_epsilon: REST_EPSILON,
            stabilize_epsilon: STABILIZE_EPSILON,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl WorldConfig {
    /// Config with a custom scale and defaults elsewhere
    pub fn with_scale(scale: f32) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Fixed timestep implied by the target frame rate
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.frames_per_second
    }

    /// Check every parameter. Called by `World::new`.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(SimError::NonPositiveScale { scale: self.scale });
        }
        for (name, value) in [("mu_s", self.mu_s), ("mu_k", self.mu_k)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::NegativeFriction { name, value });
            }
        }
        if !(self.frames_per_second.is_finite() && self.frames_per_second > 0.0) {
            return Err(SimError::InvalidParameter {
                name: "frames_per_second",
                reason: format!("must be positive, got {}", self.frames_per_second),
            });
        }
        if !(self.gravity.is_finite() && self.gravity >= 0.0) {
            return Err(SimError::InvalidParameter {
                name: "gravity",
                reason: format!("must be a non-negative magnitude, got {}", self.gravity),
            });
        }
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            return Err(SimError::InvalidParameter {
                name: "max_dt",
                reason: format!("must be positive, got {}", self.max_dt),
            });
        }
        for (name, value) in [
            ("rest_epsilon", self.rest_epsilon),
            ("stabilize_epsilon", self.stabilize_epsilon),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::InvalidParameter {
                    name,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }
        if self.max_substeps == 0 {
            return Err(SimError::InvalidParameter {
                name: "max_substeps",
                reason: "must allow at least one substep".to_string(),
            });
        }
        Ok(())
    }
}
