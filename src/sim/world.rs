//! Simulation registry and per-tick orchestration
//!
//! The world owns every body (grouped by [`EntityKind`] in the order each kind
//! first appeared, then by insertion), the ordered field list and the run
//! state. One `step` is: fields → collisions → integration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyDesc, EntityId, EntityKind, Shape, SpriteId};
use super::collision::{Contact, resolve_collisions};
use super::field::Field;
use super::units::{Scale, Units};
use crate::config::WorldConfig;
use crate::error::Result;

/// Run state of a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldPhase {
    /// Created, never run
    Unstarted,
    /// Steps are processed
    Running,
    /// Steps are ignored until `unpause`
    Paused,
    /// Terminal; the driver has shut down
    Stopped,
}

/// What a processed step did
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Timestep actually integrated, after clamping
    pub dt: f32,
    /// Contacts resolved this step, in resolution order
    pub contacts: Vec<Contact>,
}

/// Read-only per-body view for an external renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderView {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Center of mass, pixels
    pub position: Vec2,
    /// Top-left corner of the bounding box, pixels
    pub top_left: Vec2,
    pub shape: Shape,
    pub sprite: Option<SpriteId>,
}

/// A simulation session
#[derive(Debug)]
pub struct World {
    name: String,
    config: WorldConfig,
    scale: Scale,
    /// Contiguous per-kind groups
    bodies: Vec<Body>,
    fields: Vec<Box<dyn Field>>,
    phase: WorldPhase,
    time_ticks: u64,
    elapsed: f32,
    next_id: u32,
}

impl World {
    /// Validate `config` and create an empty, unstarted world
    pub fn new(name: impl Into<String>, config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let scale = Scale::new(config.scale)?;
        let name = name.into();
        log::info!("World '{}' created (scale {} px/m)", name, scale.get());

        Ok(Self {
            name,
            config,
            scale,
            bodies: Vec::new(),
            fields: Vec::new(),
            phase: WorldPhase::Unstarted,
            time_ticks: 0,
            elapsed: 0.0,
            next_id: 1,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn phase(&self) -> WorldPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == WorldPhase::Running
    }

    /// Processed steps so far
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Simulated seconds so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Gravitational acceleration magnitude
    pub fn gravity(&self, units: Units) -> f32 {
        match units {
            Units::Si => self.config.gravity,
            Units::Sim => self.scale.constant(self.config.gravity, 1),
        }
    }

    // === Registry ===

    /// Create a body in this world. It inherits the world's scale.
    pub fn spawn(&mut self, desc: BodyDesc) -> Result<EntityId> {
        let id = EntityId(self.next_id);
        let body = Body::new(id, self.scale, desc)?;
        self.next_id += 1;

        let kind = body.kind();
        let index = self
            .bodies
            .iter()
            .rposition(|b| b.kind() == kind)
            .map_or(self.bodies.len(), |last| last + 1);
        self.bodies.insert(index, body);

        log::debug!("Spawned {:?} {} in '{}'", kind, id, self.name);
        Ok(id)
    }

    /// Remove a body. Unknown ids are a logged no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<Body> {
        match self.bodies.iter().position(|b| b.id() == id) {
            Some(index) => Some(self.bodies.remove(index)),
            None => {
                log::warn!("Entity {} does not exist in world '{}', not removed", id, self.name);
                None
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id() == id)
    }

    /// Bodies of one kind, in insertion order
    pub fn entities_of_type(&self, kind: EntityKind) -> impl Iterator<Item = &Body> + '_ {
        self.bodies.iter().filter(move |b| b.kind() == kind)
    }

    /// Every body: group order, then insertion order
    pub fn all_entities(&self) -> &[Body] {
        &self.bodies
    }

    /// Kinds present, in group order
    pub fn groups(&self) -> Vec<EntityKind> {
        let mut kinds: Vec<EntityKind> = Vec::new();
        for body in &self.bodies {
            if kinds.last() != Some(&body.kind()) {
                kinds.push(body.kind());
            }
        }
        kinds
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    // === Fields ===

    /// Append a field; fields apply in the order they were added
    pub fn add_field(&mut self, field: impl Field + 'static) {
        log::debug!("Field '{}' added to '{}'", field.name(), self.name);
        self.fields.push(Box::new(field));
    }

    /// Remove every field with this name; returns how many were removed
    pub fn remove_field(&mut self, name: &str) -> usize {
        let before = self.fields.len();
        self.fields.retain(|f| f.name() != name);
        before - self.fields.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name()).collect()
    }

    /// Run every field over every dynamic body
    pub fn apply_fields(&mut self) {
        for field in &mut self.fields {
            field.apply_all(&mut self.bodies);
        }
    }

    // === Run state ===

    /// Enter `Running` from `Unstarted` or `Paused`
    pub fn unpause(&mut self) {
        match self.phase {
            WorldPhase::Unstarted | WorldPhase::Paused => {
                self.phase = WorldPhase::Running;
                log::info!("World '{}' running", self.name);
            }
            WorldPhase::Running => {}
            WorldPhase::Stopped => log::warn!("World '{}' is stopped, cannot unpause", self.name),
        }
    }

    /// Enter `Paused` from `Running`
    pub fn pause(&mut self) {
        if self.phase == WorldPhase::Running {
            self.phase = WorldPhase::Paused;
            log::info!("World '{}' paused", self.name);
        }
    }

    /// Flip between `Running` and `Paused`
    pub fn toggle_pause(&mut self) {
        match self.phase {
            WorldPhase::Running => self.pause(),
            _ => self.unpause(),
        }
    }

    /// Terminal shutdown
    pub fn stop(&mut self) {
        if self.phase != WorldPhase::Stopped {
            self.phase = WorldPhase::Stopped;
            log::info!(
                "World '{}' stopped after {} ticks ({:.2}s)",
                self.name,
                self.time_ticks,
                self.elapsed
            );
        }
    }

    /// Clamp a driver timestep into `[0, max_dt]`
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Invalid timestep {dt}, using 0");
            return 0.0;
        }
        if dt > self.config.max_dt {
            log::debug!("Timestep {dt} clamped to {}", self.config.max_dt);
            return self.config.max_dt;
        }
        dt
    }

    /// Advance one frame. Returns `None` unless the world is running.
    ///
    /// Controllers write their forces before calling this; accumulators are
    /// cleared once integration has consumed them.
    pub fn step(&mut self, dt: f32) -> Option<StepReport> {
        if !self.is_running() {
            return None;
        }
        let dt = self.clamp_dt(dt);

        for field in &mut self.fields {
            field.prepare(dt);
        }
        self.apply_fields();
        let contacts = resolve_collisions(&mut self.bodies, self.config.stabilize_epsilon);

        let epsilon = self.config.stabilize_epsilon;
        for body in &mut self.bodies {
            body.integrate(dt);
            if body.is_collidable() {
                body.stabilize(epsilon);
            }
            body.clear_force();
        }

        self.time_ticks += 1;
        self.elapsed += dt;
        Some(StepReport { dt, contacts })
    }

    /// Snapshot for drawing, taken between steps
    pub fn render_snapshot(&self) -> Vec<RenderView> {
        self.bodies
            .iter()
            .map(|b| RenderView {
                id: b.id(),
                kind: b.kind(),
                position: b.position(Units::Sim),
                top_left: b.top_left(),
                shape: b.shape(),
                sprite: b.sprite(),
            })
            .collect()
    }
}
