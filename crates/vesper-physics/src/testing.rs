//! Scripted in-memory backend for tests.
//!
//! Colliders are plain boxes placed by the test; bodies carry a velocity and
//! record every force applied to them. `integrate` advances velocities by the
//! recorded forces (unit mass) and clears them, like one simulation step.

use crate::backend::PhysicsBackend;
use std::collections::HashMap;
use vesper_core::{Aabb, Vec2};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ScriptedBody(pub u32);

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct ScriptedCollider(pub u32);

#[derive(Debug, Default, Clone)]
struct BodyState {
    velocity: Vec2,
    forces: Vec<Vec2>,
}

#[derive(Debug, Default)]
pub struct ScriptedPhysics {
    bodies: HashMap<ScriptedBody, BodyState>,
    colliders: HashMap<ScriptedCollider, Aabb>,
    next_id: u32,
}

impl ScriptedPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_body(&mut self, velocity: Vec2) -> ScriptedBody {
        let id = ScriptedBody(self.bump());
        self.bodies.insert(
            id,
            BodyState {
                velocity,
                forces: Vec::new(),
            },
        );
        id
    }

    pub fn add_collider(&mut self, bounds: Aabb) -> ScriptedCollider {
        let id = ScriptedCollider(self.bump());
        self.colliders.insert(id, bounds);
        id
    }

    /// Move or resize an existing collider
    pub fn place_collider(&mut self, collider: ScriptedCollider, bounds: Aabb) {
        self.colliders.insert(collider, bounds);
    }

    /// Forces applied since the last `integrate`, in call order
    pub fn forces(&self, body: ScriptedBody) -> &[Vec2] {
        self.bodies
            .get(&body)
            .map(|b| b.forces.as_slice())
            .unwrap_or(&[])
    }

    /// Sum of forces applied since the last `integrate`
    pub fn net_force(&self, body: ScriptedBody) -> Vec2 {
        self.forces(body).iter().copied().sum()
    }

    /// One simulation step: v += F * dt for unit mass, then forget the forces
    pub fn integrate(&mut self, dt: f32) {
        for body in self.bodies.values_mut() {
            let net: Vec2 = body.forces.drain(..).sum();
            body.velocity += net * dt;
        }
    }

    fn bump(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl PhysicsBackend for ScriptedPhysics {
    type Body = ScriptedBody;
    type Collider = ScriptedCollider;

    fn has_body(&self, body: ScriptedBody) -> bool {
        self.bodies.contains_key(&body)
    }

    fn has_collider(&self, collider: ScriptedCollider) -> bool {
        self.colliders.contains_key(&collider)
    }

    fn velocity(&self, body: ScriptedBody) -> Option<Vec2> {
        self.bodies.get(&body).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, body: ScriptedBody, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.velocity = velocity;
        }
    }

    fn add_force(&mut self, body: ScriptedBody, force: Vec2) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.forces.push(force);
        }
    }

    fn collider_bounds(&self, collider: ScriptedCollider) -> Option<Aabb> {
        self.colliders.get(&collider).copied()
    }

    fn intersects_box(&self, collider: ScriptedCollider, region: &Aabb) -> bool {
        self.colliders
            .get(&collider)
            .is_some_and(|bounds| bounds.overlaps(region))
    }
}
