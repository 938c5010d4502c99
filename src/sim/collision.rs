//! Collision detection and response for point-sampled bodies
//!
//! Each collidable body carries a [`CollisionProfile`]: fixed sample points on
//! its boundary, in pixels relative to the body's top-left corner, each paired
//! with an outward unit normal. A sample only counts while the body moves into
//! it (`normal · velocity >= 0`). Hits are resolved with a 1-D elastic
//! exchange of the velocity component along the sample normal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, EntityId};
use super::units::Units;
use crate::error::{Result, SimError};

/// A boundary point and its outward normal, in the body's local frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionSample {
    pub point: Vec2,
    pub normal: Vec2,
}

impl CollisionSample {
    /// Whether a body moving with `velocity` is pushing into this sample
    #[inline]
    pub fn is_active(&self, velocity: Vec2) -> bool {
        self.normal.dot(velocity) >= 0.0
    }
}

/// Ordered collision samples for one body shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollisionProfile {
    samples: Vec<CollisionSample>,
}

impl CollisionProfile {
    /// Build from `(local point, normal)` pairs. Normals are normalized;
    /// a zero normal is rejected.
    pub fn new(samples: impl IntoIterator<Item = (Vec2, Vec2)>) -> Result<Self> {
        let samples = samples
            .into_iter()
            .enumerate()
            .map(|(index, (point, normal))| {
                normal
                    .try_normalize()
                    .map(|normal| CollisionSample { point, normal })
                    .ok_or(SimError::InvalidNormal { index })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { samples })
    }

    /// Midpoint of each edge of a `size` box, normals facing out
    pub fn box_edges(size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            samples: vec![
                CollisionSample {
                    point: Vec2::new(0.0, half.y),
                    normal: Vec2::NEG_X,
                },
                CollisionSample {
                    point: Vec2::new(size.x, half.y),
                    normal: Vec2::X,
                },
                CollisionSample {
                    point: Vec2::new(half.x, 0.0),
                    normal: Vec2::NEG_Y,
                },
                CollisionSample {
                    point: Vec2::new(half.x, size.y),
                    normal: Vec2::Y,
                },
            ],
        }
    }

    pub fn samples(&self) -> &[CollisionSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A resolved contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Body owning the sample
    pub a: EntityId,
    /// Body whose shape contained the sample
    pub b: EntityId,
    /// Sample point in world space (pixels)
    pub point: Vec2,
    pub normal: Vec2,
}

/// Post-contact normal speeds for masses `m1`, `m2` (`None` = immovable)
pub fn elastic_normal_speeds(m1: Option<f32>, m2: Option<f32>, u1: f32, u2: f32) -> (f32, f32) {
    match (m1, m2) {
        (Some(m1), Some(m2)) => {
            let total = m1 + m2;
            let v1 = (u1 * (m1 - m2) + 2.0 * m2 * u2) / total;
            let v2 = (u2 * (m2 - m1) + 2.0 * m1 * u1) / total;
            (v1, v2)
        }
        // Limit of the formula as the other mass goes to infinity
        (Some(_), None) => (2.0 * u2 - u1, u2),
        (None, Some(_)) => (u1, 2.0 * u1 - u2),
        (None, None) => (u1, u2),
    }
}

/// Exchange the velocity components of `a` and `b` along `normal`.
/// The tangential components are untouched.
pub fn elastic_collision(a: &mut Body, b: &mut Body, normal: Vec2) {
    let u1 = a.velocity(Units::Sim).dot(normal);
    let u2 = b.velocity(Units::Sim).dot(normal);
    let (v1, v2) = elastic_normal_speeds(a.mass(), b.mass(), u1, u2);

    if a.is_dynamic() {
        a.add_velocity((v1 - u1) * normal, Units::Sim);
    }
    if b.is_dynamic() {
        b.add_velocity((v2 - u2) * normal, Units::Sim);
    }
}

/// Mutable references to two distinct bodies
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(i, j);
    if i < j {
        let (head, tail) = bodies.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = bodies.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// Test every active sample of every collidable body against every other
/// collidable body and resolve hits in registry order.
///
/// Activation is re-evaluated per sample, so a sample that was already
/// resolved this pass (and now recedes) is skipped.
pub fn resolve_collisions(bodies: &mut [Body], stabilize_epsilon: f32) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for i in 0..bodies.len() {
        let Some(profile) = bodies[i].collision().cloned() else {
            continue;
        };

        for j in 0..bodies.len() {
            if i == j || !bodies[j].is_collidable() {
                continue;
            }

            for sample in profile.samples() {
                let (a, b) = pair_mut(bodies, i, j);
                if !sample.is_active(a.velocity(Units::Sim)) {
                    continue;
                }

                let point = sample.point + a.top_left();
                if b.contains_point(point) {
                    elastic_collision(a, b, sample.normal);
                    a.stabilize(stabilize_epsilon);
                    b.stabilize(stabilize_epsilon);

                    log::debug!("Contact {} -> {} at {:?}", a.id(), b.id(), point);
                    contacts.push(Contact {
                        a: a.id(),
                        b: b.id(),
                        point,
                        normal: sample.normal,
                    });
                }
            }
        }
    }

    contacts
}
