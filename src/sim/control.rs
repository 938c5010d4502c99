//! Controller-side force commands
//!
//! Controllers run before `World::step` and overwrite a body's force
//! accumulator with an authoritative command. Extra input-driven force
//! injection is only allowed when [`ControllerConfig::inject_forces`] is set.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::Body;
use super::units::Units;

/// A screen axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Component of `v` along this axis
    #[inline]
    pub fn component(self, v: Vec2) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    /// Point with `free` on this axis and `fixed` on the other
    #[inline]
    pub fn compose(self, free: f32, fixed: f32) -> Vec2 {
        match self {
            Axis::X => Vec2::new(free, fixed),
            Axis::Y => Vec2::new(fixed, free),
        }
    }
}

/// Per-controller switches, passed in by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Allow the input-driven kick force
    pub inject_forces: bool,
    /// Kick force in newtons
    pub kick_force: Vec2,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            inject_forces: false,
            kick_force: Vec2::new(-70.0, 0.0),
        }
    }
}

impl ControllerConfig {
    /// Add the kick force if requested and allowed. Returns whether it was applied.
    pub fn kick(&self, body: &mut Body, requested: bool) -> bool {
        if requested && self.inject_forces {
            body.add_force(self.kick_force, Units::Si);
            true
        } else {
            false
        }
    }
}

/// Proportional-derivative tracker toward a target at rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdController {
    /// Stiffness (simulation force per pixel of error)
    pub kp: f32,
    /// Damping (simulation force per pixel/s of velocity)
    pub kv: f32,
    /// Single degree of freedom: the free axis and the pixel coordinate held
    /// on the other one
    pub constraint: Option<(Axis, f32)>,
}

impl PdController {
    pub fn new(kp: f32, kv: f32) -> Self {
        Self {
            kp,
            kv,
            constraint: None,
        }
    }

    /// Track only along `axis`, holding `fixed` on the other axis
    pub fn along(mut self, axis: Axis, fixed: f32) -> Self {
        self.constraint = Some((axis, fixed));
        self
    }

    /// Where the body should be for a raw target (pixels)
    pub fn desired(&self, target: Vec2) -> Vec2 {
        match self.constraint {
            Some((axis, fixed)) => axis.compose(axis.component(target), fixed),
            None => target,
        }
    }

    /// Command force in simulation units
    pub fn command(&self, body: &Body, target: Vec2) -> Vec2 {
        let error = self.desired(target) - body.position(Units::Sim);
        let damping = -body.velocity(Units::Sim);
        self.kp * error + self.kv * damping
    }

    /// Overwrite the body's accumulator with the command force
    pub fn drive(&self, body: &mut Body, target: Vec2) {
        let force = self.command(body, target);
        body.set_force(force, Units::Sim);
    }
}
