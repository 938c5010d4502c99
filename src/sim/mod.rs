//! Rigid-body simulation core
//!
//! Everything here is single-threaded and deterministic:
//! - Fixed timestep supplied by the driver
//! - Stable iteration order (kind group, then insertion)
//! - No rendering, input or platform dependencies

pub mod body;
pub mod collision;
pub mod control;
pub mod field;
pub mod units;
pub mod world;

pub use body::{Body, BodyDesc, EntityId, EntityKind, Motion, Shape, SpriteId};
pub use collision::{
    CollisionProfile, CollisionSample, Contact, elastic_collision, elastic_normal_speeds,
    resolve_collisions,
};
pub use control::{Axis, ControllerConfig, PdController};
pub use field::{Field, Friction, GravityAxis, PointSource, UniformGravity};
pub use units::{Scale, Units};
pub use world::{RenderView, StepReport, World, WorldPhase};
