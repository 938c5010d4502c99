//! Error taxonomy
//!
//! Construction-time problems are returned as [`SimError`]. Per-tick numerical
//! edge cases never reach the caller: they are logged and degrade to zero force
//! or zero velocity so the tick loop keeps running.

use crate::sim::EntityId;

/// Errors produced while building worlds, bodies and fields.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The world scale must be a positive, finite number of pixels per meter.
    #[error("scale must be positive and finite, got {scale}")]
    NonPositiveScale { scale: f32 },

    /// A dynamic body needs a positive mass for `a = F / m`.
    #[error("mass must be positive and finite, got {mass}")]
    NonPositiveMass { mass: f32 },

    /// Friction coefficients are non-negative reals.
    #[error("friction coefficient '{name}' must be non-negative, got {value}")]
    NegativeFriction { name: &'static str, value: f32 },

    /// Any other out-of-range construction parameter.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Collision sample normals must be non-zero (they are stored normalized).
    #[error("collision sample {index} has a zero or non-finite normal")]
    InvalidNormal { index: usize },

    /// An electrostatic field was built from a source without a charge.
    #[error("field '{field}' requires a charged source")]
    MissingCharge { field: String },

    /// Zero separation between a point source and the body it acts on.
    ///
    /// Fields recover from this locally; it is only surfaced by
    /// [`crate::sim::Field::force_on`].
    #[error("field '{field}' has zero separation from entity {entity}")]
    DegenerateGeometry { field: String, entity: EntityId },

    /// A JSON configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
