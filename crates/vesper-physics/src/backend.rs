//! The seam between Vesper and a rigid-body simulation

use std::fmt::Debug;
use std::hash::Hash;
use vesper_core::{Aabb, Vec2};

/// Operations Vesper needs from the external simulation.
///
/// Handles are opaque to Vesper; they only need to be cheap to copy, compare,
/// and hash. Lookups of unknown handles return `None` (or do nothing for
/// writes); components verify their handles once at construction.
pub trait PhysicsBackend {
    type Body: Copy + Eq + Hash + Debug;
    type Collider: Copy + Eq + Hash + Debug;

    fn has_body(&self, body: Self::Body) -> bool;

    fn has_collider(&self, collider: Self::Collider) -> bool;

    /// Current linear velocity of a body
    fn velocity(&self, body: Self::Body) -> Option<Vec2>;

    /// Overwrite the linear velocity of a body
    fn set_velocity(&mut self, body: Self::Body, velocity: Vec2);

    /// Apply a continuous force for the next simulation step
    fn add_force(&mut self, body: Self::Body, force: Vec2);

    /// World-space bounds of a collider
    fn collider_bounds(&self, collider: Self::Collider) -> Option<Aabb>;

    /// Whether a collider's shape overlaps an axis-aligned region
    fn intersects_box(&self, collider: Self::Collider, region: &Aabb) -> bool;
}
