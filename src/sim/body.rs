//! Simulated bodies and their kinematics
//!
//! A [`Body`] stores position, velocity, acceleration and its force
//! accumulator in simulation units. Reads and writes from outside name their
//! unit space explicitly with [`Units`].

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::CollisionProfile;
use super::units::{Scale, Units};
use crate::error::{Result, SimError};

/// Stable identity of a body within its world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grouping discriminator. Registry groups are keyed by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Plain point mass
    Newtonian,
    Paddle,
    Ball,
    /// Immovable arena boundary
    Wall,
}

/// Opaque image handle owned by the external renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

/// Whether a body takes part in force accumulation and integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Mass in kg; inertia (kg·m²) is stored but rotation is not simulated
    Dynamic { mass: f32, inertia: f32 },
    /// Never integrated, never acted on by fields, infinite mass in contacts
    Static,
}

/// Hit-test geometry, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box anchored at the body's top-left corner
    Rect { size: Vec2 },
    /// Disc centered on the body's position
    Circle { radius: f32 },
}

impl Shape {
    /// Bounding box size
    pub fn extent(&self) -> Vec2 {
        match *self {
            Shape::Rect { size } => size,
            Shape::Circle { radius } => Vec2::splat(radius * 2.0),
        }
    }
}

/// Construction parameters. Kinematic values are SI (meters, m/s, newtons).
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: EntityKind,
    pub motion: Motion,
    pub position: Vec2,
    pub velocity: Vec2,
    pub force: Vec2,
    /// Offset of the center of mass from the top-left corner (pixels).
    /// Defaults to the middle of the shape.
    pub center_of_mass: Option<Vec2>,
    pub shape: Shape,
    pub charge: Option<f32>,
    pub collision: Option<CollisionProfile>,
    pub sprite: Option<SpriteId>,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            kind: EntityKind::Newtonian,
            motion: Motion::Dynamic {
                mass: 1.0,
                inertia: 1.0,
            },
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            center_of_mass: None,
            shape: Shape::Rect {
                size: Vec2::splat(20.0),
            },
            charge: None,
            collision: None,
            sprite: None,
        }
    }
}

impl BodyDesc {
    /// Dynamic body of the given kind and mass at an SI position
    pub fn dynamic(kind: EntityKind, mass: f32, position: Vec2) -> Self {
        Self {
            kind,
            motion: Motion::Dynamic { mass, inertia: 1.0 },
            position,
            ..Default::default()
        }
    }

    /// Immovable wall covering `size` pixels, centered on an SI position
    pub fn wall(position: Vec2, size: Vec2) -> Self {
        Self {
            kind: EntityKind::Wall,
            motion: Motion::Static,
            position,
            shape: Shape::Rect { size },
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_charge(mut self, charge: f32) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_collision(mut self, profile: CollisionProfile) -> Self {
        self.collision = Some(profile);
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteId) -> Self {
        self.sprite = Some(sprite);
        self
    }
}

/// A simulated body
#[derive(Debug, Clone)]
pub struct Body {
    id: EntityId,
    kind: EntityKind,
    scale: Scale,
    motion: Motion,
    position: Vec2,
    velocity: Vec2,
    acceleration: Vec2,
    force: Vec2,
    center_of_mass: Vec2,
    shape: Shape,
    charge: Option<f32>,
    collision: Option<CollisionProfile>,
    sprite: Option<SpriteId>,
}

impl Body {
    /// Build a body in a world of the given scale.
    ///
    /// Fails on a non-positive mass; integration never divides by zero.
    pub fn new(id: EntityId, scale: Scale, desc: BodyDesc) -> Result<Self> {
        if let Motion::Dynamic { mass, .. } = desc.motion {
            if !(mass.is_finite() && mass > 0.0) {
                return Err(SimError::NonPositiveMass { mass });
            }
        }
        let center_of_mass = desc.center_of_mass.unwrap_or(desc.shape.extent() / 2.0);
        let velocity = match desc.motion {
            Motion::Dynamic { .. } => scale.to_sim(desc.velocity),
            Motion::Static => Vec2::ZERO,
        };

        Ok(Self {
            id,
            kind: desc.kind,
            scale,
            motion: desc.motion,
            position: scale.to_sim(desc.position),
            velocity,
            acceleration: Vec2::ZERO,
            force: scale.to_sim(desc.force),
            center_of_mass,
            shape: desc.shape,
            charge: desc.charge,
            collision: desc.collision,
            sprite: desc.sprite,
        })
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[inline]
    pub fn scale(&self) -> Scale {
        self.scale
    }

    #[inline]
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// True when the body has mass and force semantics
    #[inline]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.motion, Motion::Dynamic { .. })
    }

    /// Mass in kg, `None` for static bodies
    #[inline]
    pub fn mass(&self) -> Option<f32> {
        match self.motion {
            Motion::Dynamic { mass, .. } => Some(mass),
            Motion::Static => None,
        }
    }

    pub fn inertia(&self) -> Option<f32> {
        match self.motion {
            Motion::Dynamic { inertia, .. } => Some(inertia),
            Motion::Static => None,
        }
    }

    #[inline]
    pub fn charge(&self) -> Option<f32> {
        self.charge
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn center_of_mass(&self) -> Vec2 {
        self.center_of_mass
    }

    #[inline]
    pub fn sprite(&self) -> Option<SpriteId> {
        self.sprite
    }

    /// Collision samples, if the body is collidable
    #[inline]
    pub fn collision(&self) -> Option<&CollisionProfile> {
        self.collision.as_ref()
    }

    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.collision.is_some()
    }

    // === Queries ===

    pub fn position(&self, units: Units) -> Vec2 {
        self.scale.export(self.position, units)
    }

    pub fn velocity(&self, units: Units) -> Vec2 {
        self.scale.export(self.velocity, units)
    }

    pub fn acceleration(&self, units: Units) -> Vec2 {
        self.scale.export(self.acceleration, units)
    }

    pub fn force(&self, units: Units) -> Vec2 {
        self.scale.export(self.force, units)
    }

    /// Top-left corner of the bounding box (pixels)
    pub fn top_left(&self) -> Vec2 {
        self.position - self.center_of_mass
    }

    // === Mutation ===

    /// Accumulate a force
    pub fn add_force(&mut self, force: Vec2, units: Units) {
        self.force += self.scale.import(force, units);
    }

    /// Overwrite the accumulator with an authoritative command force
    pub fn set_force(&mut self, force: Vec2, units: Units) {
        self.force = self.scale.import(force, units);
    }

    pub fn clear_force(&mut self) {
        self.force = Vec2::ZERO;
    }

    pub fn set_velocity(&mut self, velocity: Vec2, units: Units) {
        self.velocity = self.scale.import(velocity, units);
    }

    pub fn add_velocity(&mut self, delta: Vec2, units: Units) {
        self.velocity += self.scale.import(delta, units);
    }

    pub fn set_position(&mut self, position: Vec2, units: Units) {
        self.position = self.scale.import(position, units);
    }

    /// Advance one step with semi-implicit Euler.
    ///
    /// Acceleration is re-derived from the accumulator every call, so a force
    /// only acts for as long as someone keeps applying it.
    pub fn integrate(&mut self, dt: f32) {
        let Motion::Dynamic { mass, .. } = self.motion else {
            return;
        };
        self.acceleration = self.force / mass;
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Zero any velocity component smaller than `epsilon`
    pub fn stabilize(&mut self, epsilon: f32) {
        if self.velocity.x.abs() < epsilon {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < epsilon {
            self.velocity.y = 0.0;
        }
    }

    /// Whether a world-space point (pixels) lies inside this body's shape
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self.shape {
            Shape::Rect { size } => {
                let min = self.top_left();
                let max = min + size;
                point.x >= min.x && point.x < max.x && point.y >= min.y && point.y < max.y
            }
            Shape::Circle { radius } => point.distance_squared(self.position) <= radius * radius,
        }
    }
}
