//! Newton Pong - a small rigid-body simulation core
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (kinematics, force fields, collisions)
//! - `pong`: Two-paddle Pong game driven by the simulation core
//! - `config`: World construction parameters
//! - `error`: Error taxonomy shared by every module

pub mod config;
pub mod error;
pub mod pong;
pub mod sim;

pub use config::WorldConfig;
pub use error::{Result, SimError};

/// Simulation configuration constants
pub mod consts {
    /// Default pixels per meter
    pub const DEFAULT_SCALE: f32 = 10.0;
    /// Target frame rate of the external pacing loop (advisory only)
    pub const DEFAULT_FPS: f32 = 100.0;
    /// Fixed simulation timestep matching the default frame rate
    pub const SIM_DT: f32 = 1.0 / DEFAULT_FPS;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest dt a single step will integrate (seconds)
    pub const MAX_DT: f32 = 0.1;

    /// Standard gravitational acceleration (m/s²)
    pub const STANDARD_GRAVITY: f32 = 9.8;
    /// Default static friction coefficient
    pub const DEFAULT_MU_S: f32 = 0.3;
    /// Default kinetic friction coefficient
    pub const DEFAULT_MU_K: f32 = 0.2;

    /// Speed under which a body counts as resting for friction (simulation units)
    pub const REST_EPSILON: f32 = 0.01;
    /// Velocity components smaller than this are snapped to zero after contact
    pub const STABILIZE_EPSILON: f32 = 1e-4;

    /// Gravitational constant (m³ kg⁻¹ s⁻²)
    pub const GRAVITATIONAL_CONSTANT: f32 = 6.674e-11;
    /// Vacuum permittivity (C² N⁻¹ m⁻²)
    pub const VACUUM_PERMITTIVITY: f32 = 8.85e-12;
}
