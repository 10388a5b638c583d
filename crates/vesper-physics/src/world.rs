//! Physics world wrapping Rapier 2D

use crate::backend::PhysicsBackend;
use crate::contact::{ContactEvent, ContactPhase};
use rapier2d::parry::query;
use rapier2d::parry::shape::Cuboid;
use rapier2d::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vesper_core::{Aabb, Vec2};

/// Rigid-body setup for a character: a slippery, rotation-locked dynamic box.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySettings {
    pub mass: f32,
    pub linear_damping: f32,
    pub gravity_scale: f32,
    pub friction: f32,
    /// Continuous collision detection, so fast falls don't tunnel
    pub continuous: bool,
    pub lock_rotation: bool,
}

impl Default for BodySettings {
    fn default() -> Self {
        Self {
            mass: 0.001,
            linear_damping: 2.0,
            gravity_scale: 5.0,
            friction: 0.05,
            continuous: true,
            lock_rotation: true,
        }
    }
}

/// Handles created by [`PhysicsWorld::spawn_character`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterHandles {
    pub body: RigidBodyHandle,
    /// Blocking box, the reference for the directional box cast
    pub collider: ColliderHandle,
    /// Sensor box of the same size, for interaction triggers
    pub interaction: ColliderHandle,
}

type Pair = (ColliderHandle, ColliderHandle);

/// Wraps Rapier's physics pipeline and body/collider sets
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    collision_recv: crossbeam::channel::Receiver<CollisionEvent>,
    contact_force_recv: crossbeam::channel::Receiver<ContactForceEvent>,
    event_handler: ChannelEventCollector,

    /// Pairs in contact after the last step, with their sensor flag
    active_pairs: HashMap<Pair, bool>,
    /// Contact events produced by steps since the last drain
    pending: Vec<ContactEvent<ColliderHandle>>,
}

impl PhysicsWorld {
    /// Create a new physics world with standard gravity
    pub fn new() -> Self {
        let (collision_send, collision_recv) = crossbeam::channel::unbounded();
        let (contact_force_send, contact_force_recv) = crossbeam::channel::unbounded();
        let event_handler = ChannelEventCollector::new(collision_send, contact_force_send);

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            gravity: vector![0.0, -9.81],
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collision_recv,
            contact_force_recv,
            event_handler,
            active_pairs: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Step the simulation by dt seconds and collect contact events.
    ///
    /// Forces added since the previous step act for this step only. Every pair
    /// still in contact after the step that did not start during it reports a
    /// `Stay` event.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_handler,
        );

        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }
        // Contact forces are not consumed here
        while self.contact_force_recv.try_recv().is_ok() {}

        let mut started = Vec::new();
        while let Ok(event) = self.collision_recv.try_recv() {
            match event {
                CollisionEvent::Started(h1, h2, flags) => {
                    let sensor = flags.contains(CollisionEventFlags::SENSOR);
                    self.active_pairs.insert((h1, h2), sensor);
                    started.push((h1, h2));
                    self.pending.push(contact(ContactPhase::Enter, h1, h2, sensor));
                }
                CollisionEvent::Stopped(h1, h2, flags) => {
                    let sensor = flags.contains(CollisionEventFlags::SENSOR);
                    self.active_pairs.remove(&(h1, h2));
                    self.active_pairs.remove(&(h2, h1));
                    self.pending.push(contact(ContactPhase::Exit, h1, h2, sensor));
                }
            }
        }

        let mut staying: Vec<_> = self
            .active_pairs
            .iter()
            .filter(|(pair, _)| !started.contains(*pair))
            .map(|(&(h1, h2), &sensor)| contact(ContactPhase::Stay, h1, h2, sensor))
            .collect();
        // HashMap order is arbitrary; keep runs reproducible
        staying.sort_by_key(|e| (e.collider_a.into_raw_parts(), e.collider_b.into_raw_parts()));
        self.pending.extend(staying);
    }

    /// Drain contact events produced since the last call
    pub fn drain_contact_events(&mut self) -> Vec<ContactEvent<ColliderHandle>> {
        std::mem::take(&mut self.pending)
    }

    /// Insert a rigid body and return its handle
    pub fn insert_rigid_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(body)
    }

    /// Insert a collider attached to a rigid body
    pub fn insert_collider_with_parent(
        &mut self,
        collider: Collider,
        parent: RigidBodyHandle,
    ) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Add a fixed box (level geometry) centered at `center`
    pub fn add_static_box(&mut self, center: Vec2, half_extents: Vec2) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .translation(vector![center.x, center.y])
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a fixed sensor box; it reports contacts but blocks nothing
    pub fn add_sensor_box(&mut self, center: Vec2, half_extents: Vec2) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .translation(vector![center.x, center.y])
            .sensor(true)
            .build();
        self.collider_set.insert(collider)
    }

    /// Create a character body with a blocking box and an interaction sensor.
    pub fn spawn_character(
        &mut self,
        position: Vec2,
        half_extents: Vec2,
        settings: &BodySettings,
    ) -> CharacterHandles {
        let mut builder = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y])
            .linear_damping(settings.linear_damping)
            .gravity_scale(settings.gravity_scale)
            .ccd_enabled(settings.continuous);
        if settings.lock_rotation {
            builder = builder.lock_rotations();
        }
        let body = self.insert_rigid_body(builder.build());

        let blocking = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .mass(settings.mass)
            .friction(settings.friction)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let collider = self.insert_collider_with_parent(blocking, body);

        let sensor = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .sensor(true)
            .density(0.0)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let interaction = self.insert_collider_with_parent(sensor, body);

        CharacterHandles {
            body,
            collider,
            interaction,
        }
    }

    /// World position of a body
    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(handle)
            .map(|rb| Vec2::new(rb.translation().x, rb.translation().y))
    }

    /// Get a rigid body by handle
    pub fn get_rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBackend for PhysicsWorld {
    type Body = RigidBodyHandle;
    type Collider = ColliderHandle;

    fn has_body(&self, body: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(body)
    }

    fn has_collider(&self, collider: ColliderHandle) -> bool {
        self.collider_set.contains(collider)
    }

    fn velocity(&self, body: RigidBodyHandle) -> Option<Vec2> {
        self.rigid_body_set
            .get(body)
            .map(|rb| Vec2::new(rb.linvel().x, rb.linvel().y))
    }

    fn set_velocity(&mut self, body: RigidBodyHandle, velocity: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            rb.set_linvel(vector![velocity.x, velocity.y], true);
        }
    }

    fn add_force(&mut self, body: RigidBodyHandle, force: Vec2) {
        if let Some(rb) = self.rigid_body_set.get_mut(body) {
            rb.add_force(vector![force.x, force.y], true);
        }
    }

    fn collider_bounds(&self, collider: ColliderHandle) -> Option<Aabb> {
        self.collider_set.get(collider).map(|c| {
            let aabb = c.compute_aabb();
            Aabb::from_min_max(
                Vec2::new(aabb.mins.x, aabb.mins.y),
                Vec2::new(aabb.maxs.x, aabb.maxs.y),
            )
        })
    }

    fn intersects_box(&self, collider: ColliderHandle, region: &Aabb) -> bool {
        let Some(c) = self.collider_set.get(collider) else {
            return false;
        };
        let probe = Cuboid::new(vector![region.half_extents.x, region.half_extents.y]);
        let probe_pos = Isometry::translation(region.center.x, region.center.y);
        query::intersection_test(&probe_pos, &probe, c.position(), c.shape()).unwrap_or(false)
    }
}

fn contact(
    phase: ContactPhase,
    a: ColliderHandle,
    b: ColliderHandle,
    sensor: bool,
) -> ContactEvent<ColliderHandle> {
    ContactEvent {
        phase,
        collider_a: a,
        collider_b: b,
        sensor,
    }
}
