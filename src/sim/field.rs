//! Force fields
//!
//! A [`Field`] contributes a force to every dynamic body in the world each
//! tick. Physical constants are given in SI at construction and converted to
//! simulation units once, so per-tick math stays in pixel space.

use std::f32::consts::PI;
use std::fmt;

use glam::Vec2;

use super::body::{Body, EntityId};
use super::units::{Scale, Units, direction};
use crate::config::WorldConfig;
use crate::error::{Result, SimError};

/// A force generator acting on dynamic bodies
pub trait Field: fmt::Debug {
    fn name(&self) -> &str;

    /// Force this field exerts on `body`, in simulation units.
    ///
    /// Returns [`SimError::DegenerateGeometry`] when the force is undefined
    /// (zero separation); callers skip the body for this tick.
    fn force_on(&self, body: &Body) -> Result<Vec2>;

    /// Add this field's force to `body`'s accumulator. Static bodies are skipped.
    fn apply(&self, body: &mut Body) {
        if !body.is_dynamic() {
            return;
        }
        match self.force_on(body) {
            Ok(force) => body.add_force(force, Units::Sim),
            Err(err) => log::warn!("{err}, no force applied"),
        }
    }

    /// Timestep of the coming batch. Called by `World::step` before fields apply.
    fn prepare(&mut self, _dt: f32) {}

    /// Refresh anything the field reads from other bodies. Runs before each batch.
    fn sync(&mut self, _bodies: &[Body]) {}

    /// Apply to every dynamic body, in registry order
    fn apply_all(&mut self, bodies: &mut [Body]) {
        self.sync(bodies);
        for body in bodies.iter_mut().filter(|b| b.is_dynamic()) {
            self.apply(body);
        }
    }
}

// ---------------------------------------------------------------------------
// Uniform gravity
// ---------------------------------------------------------------------------

/// Direction a uniform gravity field pulls in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GravityAxis {
    /// Into the screen (top-down view): no in-plane force, only a normal load
    OutOfPlane,
    /// Along a unit direction in the simulation plane
    InPlane(Vec2),
}

/// Constant `g · mass` force
#[derive(Debug, Clone)]
pub struct UniformGravity {
    /// Acceleration in simulation units
    g: f32,
    axis: GravityAxis,
}

impl UniformGravity {
    /// `g` in m/s². An in-plane direction is normalized; zero is rejected.
    pub fn new(scale: Scale, g: f32, axis: GravityAxis) -> Result<Self> {
        if !(g.is_finite() && g >= 0.0) {
            return Err(SimError::InvalidParameter {
                name: "g",
                reason: format!("must be a non-negative magnitude, got {g}"),
            });
        }
        let axis = match axis {
            GravityAxis::InPlane(dir) => {
                let dir = direction(dir).ok_or_else(|| SimError::InvalidParameter {
                    name: "axis",
                    reason: "gravity direction must be non-zero".to_string(),
                })?;
                GravityAxis::InPlane(dir)
            }
            GravityAxis::OutOfPlane => GravityAxis::OutOfPlane,
        };
        Ok(Self {
            g: scale.constant(g, 1),
            axis,
        })
    }

    /// Screen-down gravity (positive y)
    pub fn downward(scale: Scale, g: f32) -> Result<Self> {
        Self::new(scale, g, GravityAxis::InPlane(Vec2::Y))
    }

    /// Acceleration magnitude in simulation units
    pub fn magnitude(&self) -> f32 {
        self.g
    }
}

impl Field for UniformGravity {
    fn name(&self) -> &str {
        "Gravity"
    }

    fn force_on(&self, body: &Body) -> Result<Vec2> {
        let mass = body.mass().unwrap_or(0.0);
        Ok(match self.axis {
            GravityAxis::OutOfPlane => Vec2::ZERO,
            GravityAxis::InPlane(dir) => dir * self.g * mass,
        })
    }
}

// ---------------------------------------------------------------------------
// Point sources
// ---------------------------------------------------------------------------

/// Where a point source sits
#[derive(Debug, Clone, Copy, PartialEq)]
enum Anchor {
    /// Fixed position (simulation units)
    Fixed(Vec2),
    /// Follows a body; position refreshed by `sync`
    Body { id: EntityId, position: Option<Vec2> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    /// `G · M` pre-scaled by scale³; pulls toward the source
    Gravitational { gm: f32 },
    /// `q / (4π ε0)` pre-scaled by scale³; like charges repel
    Electrostatic { kq: f32 },
}

/// Inverse-square field around a point
#[derive(Debug, Clone)]
pub struct PointSource {
    name: String,
    anchor: Anchor,
    interaction: Interaction,
}

impl PointSource {
    /// Gravity of a fixed mass `mass` (kg) at an SI position
    pub fn gravity(scale: Scale, position: Vec2, mass: f32, g_const: f32) -> Result<Self> {
        let g_const = positive_constant("g_const", g_const)?;
        Ok(Self {
            name: "PlanarGravity".to_string(),
            anchor: Anchor::Fixed(scale.to_sim(position)),
            interaction: Interaction::Gravitational {
                gm: scale.constant(g_const * positive_mass(mass)?, 3),
            },
        })
    }

    /// Gravity of a dynamic body, following it as it moves
    pub fn gravity_of(source: &Body, g_const: f32) -> Result<Self> {
        let g_const = positive_constant("g_const", g_const)?;
        let mass = source.mass().ok_or_else(|| SimError::InvalidParameter {
            name: "source",
            reason: format!("gravity source {} has no mass", source.id()),
        })?;
        Ok(Self {
            name: "PlanarGravity".to_string(),
            anchor: Anchor::Body {
                id: source.id(),
                position: Some(source.position(Units::Sim)),
            },
            interaction: Interaction::Gravitational {
                gm: source.scale().constant(g_const * mass, 3),
            },
        })
    }

    /// Electric field of a charged body; `permittivity` in C²/(N·m²)
    pub fn electric(source: &Body, permittivity: f32) -> Result<Self> {
        let name = "ElectricField".to_string();
        let charge = source
            .charge()
            .ok_or_else(|| SimError::MissingCharge { field: name.clone() })?;
        let permittivity = positive_constant("permittivity", permittivity)?;
        let k = 1.0 / (4.0 * PI * permittivity);
        Ok(Self {
            name,
            anchor: Anchor::Body {
                id: source.id(),
                position: Some(source.position(Units::Sim)),
            },
            interaction: Interaction::Electrostatic {
                kq: source.scale().constant(k * charge, 3),
            },
        })
    }

    /// Current source position (simulation units); `None` if its body is gone
    pub fn source_position(&self) -> Option<Vec2> {
        match self.anchor {
            Anchor::Fixed(position) => Some(position),
            Anchor::Body { position, .. } => position,
        }
    }

    fn source_id(&self) -> Option<EntityId> {
        match self.anchor {
            Anchor::Fixed(_) => None,
            Anchor::Body { id, .. } => Some(id),
        }
    }
}

fn positive_constant(name: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter {
            name,
            reason: format!("must be positive, got {value}"),
        })
    }
}

fn positive_mass(mass: f32) -> Result<f32> {
    if mass.is_finite() && mass > 0.0 {
        Ok(mass)
    } else {
        Err(SimError::NonPositiveMass { mass })
    }
}

impl Field for PointSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn force_on(&self, body: &Body) -> Result<Vec2> {
        // A source never acts on itself
        if self.source_id() == Some(body.id()) {
            log::trace!("{}: skipping source {}", self.name, body.id());
            return Ok(Vec2::ZERO);
        }
        let Some(source) = self.source_position() else {
            return Ok(Vec2::ZERO);
        };

        let d = source - body.position(Units::Sim);
        let r_squared = d.length_squared();
        let Some(toward) = direction(d) else {
            return Err(SimError::DegenerateGeometry {
                field: self.name.clone(),
                entity: body.id(),
            });
        };

        Ok(match self.interaction {
            Interaction::Gravitational { gm } => {
                let mass = body.mass().unwrap_or(0.0);
                toward * (gm * mass / r_squared)
            }
            Interaction::Electrostatic { kq } => match body.charge() {
                Some(q) => -toward * (kq * q / r_squared),
                None => Vec2::ZERO,
            },
        })
    }

    fn sync(&mut self, bodies: &[Body]) {
        if let Anchor::Body { id, position } = &mut self.anchor {
            let found = bodies
                .iter()
                .find(|b| b.id() == *id)
                .map(|b| b.position(Units::Sim));
            if found.is_none() && position.is_some() {
                log::warn!("{}: source {} left the world, field inactive", self.name, id);
            }
            *position = found;
        }
    }
}

// ---------------------------------------------------------------------------
// Friction
// ---------------------------------------------------------------------------

/// Static/kinetic friction against a surface under gravity `g`.
///
/// Reads the body's accumulated force, so it belongs after the fields and
/// controller commands it should resist.
#[derive(Debug, Clone)]
pub struct Friction {
    mu_s: f32,
    mu_k: f32,
    /// Normal acceleration in simulation units
    g: f32,
    rest_epsilon: f32,
    /// Timestep of the current batch; 0 until the first `prepare`
    dt: f32,
}

impl Friction {
    /// `g` in m/s²; `rest_epsilon` in simulation units
    pub fn new(scale: Scale, mu_s: f32, mu_k: f32, g: f32, rest_epsilon: f32) -> Result<Self> {
        for (name, value) in [("mu_s", mu_s), ("mu_k", mu_k)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::NegativeFriction { name, value });
            }
        }
        if !(rest_epsilon.is_finite() && rest_epsilon >= 0.0) {
            return Err(SimError::InvalidParameter {
                name: "rest_epsilon",
                reason: format!("must be non-negative, got {rest_epsilon}"),
            });
        }
        Ok(Self {
            mu_s,
            mu_k,
            g: scale.constant(g, 1),
            rest_epsilon,
            dt: 0.0,
        })
    }

    pub fn from_config(scale: Scale, config: &WorldConfig) -> Result<Self> {
        Self::new(
            scale,
            config.mu_s,
            config.mu_k,
            config.gravity,
            config.rest_epsilon,
        )
    }

    fn is_resting(&self, body: &Body) -> bool {
        body.velocity(Units::Sim).length() <= self.rest_epsilon
    }
}

impl Field for Friction {
    fn name(&self) -> &str {
        "Friction"
    }

    fn force_on(&self, body: &Body) -> Result<Vec2> {
        let mass = body.mass().unwrap_or(0.0);
        let normal_load = mass * self.g;

        if self.is_resting(body) {
            let applied = body.force(Units::Sim);
            let magnitude = applied.length();
            if magnitude > 0.0 {
                // Cancel up to all of the applied force, never more
                let ratio = (self.mu_s * normal_load / magnitude).min(1.0);
                return Ok(-ratio * applied);
            }
            return Ok(Vec2::ZERO);
        }

        // Kinetic friction can stop a body within a step but never reverse it
        let velocity = body.velocity(Units::Sim);
        let mut magnitude = self.mu_k * normal_load;
        if self.dt > 0.0 {
            magnitude = magnitude.min(mass * velocity.length() / self.dt);
        }
        Ok(-magnitude * velocity.normalize_or_zero())
    }

    fn prepare(&mut self, dt: f32) {
        self.dt = dt;
    }

    fn apply(&self, body: &mut Body) {
        if !body.is_dynamic() {
            return;
        }
        if self.is_resting(body) && body.force(Units::Sim) == Vec2::ZERO {
            body.set_velocity(Vec2::ZERO, Units::Sim);
            return;
        }
        if let Ok(force) = self.force_on(body) {
            body.add_force(force, Units::Sim);
        }
    }
}
