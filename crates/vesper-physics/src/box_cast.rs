//! Directional box cast - four cardinal probes around a reference box.
//!
//! Each probe is a thin box laid against one face of the reference box. When
//! contacts change, [`DirectionalBoxCast::get_hits`] re-tests every touched
//! collider against all four probes and rebuilds the per-collider hit table;
//! [`DirectionalBoxCast::is_hit`] answers from that table until the next
//! recomputation.

use crate::backend::PhysicsBackend;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use vesper_core::{Aabb, Direction, DirectionMask, Vec2};

/// Default probe thickness relative to the reference box
pub const DEFAULT_SIZE_MULTIPLIER: f32 = 0.02;

/// Default scratch buffer capacity
pub const DEFAULT_HIT_BUFFER_SIZE: usize = 20;

fn default_size_multiplier() -> f32 {
    DEFAULT_SIZE_MULTIPLIER
}

/// Placement of one probe relative to the reference box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub direction: Direction,
    /// Extra world-space shift applied after placing the probe against the face
    #[serde(default)]
    pub offset: Vec2,
    /// Probe thickness as a fraction of the reference extent along `direction`
    #[serde(default = "default_size_multiplier")]
    pub size_multiplier: f32,
}

impl ProbeConfig {
    pub fn new(direction: Direction, size_multiplier: f32) -> Self {
        Self {
            direction,
            offset: Vec2::ZERO,
            size_multiplier,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// The probe box for a given reference box.
    ///
    /// The probe sits flush against the face of `reference` in `direction`.
    /// Its thickness is the reference extent along that axis times
    /// `size_multiplier`; across the axis it is the reference extent minus one
    /// thickness at each end, so a wall beside the body never reads as floor.
    pub fn region(&self, reference: &Aabb) -> Aabb {
        let size = reference.size();
        let axis = self.direction.to_vec2();
        let (along, across) = if self.direction.is_vertical() {
            (size.y, size.x)
        } else {
            (size.x, size.y)
        };

        let thickness = along * self.size_multiplier.max(0.0);
        let cross = (across - 2.0 * thickness).max(0.0);
        let half_extents = if self.direction.is_vertical() {
            Vec2::new(cross * 0.5, thickness * 0.5)
        } else {
            Vec2::new(thickness * 0.5, cross * 0.5)
        };

        let face = reference.half_extents.dot(axis.abs());
        let center = reference.center + axis * (face + thickness * 0.5) + self.offset;
        Aabb::new(center, half_extents)
    }
}

/// The four default probes, one per direction.
pub fn default_probes() -> [ProbeConfig; 4] {
    Direction::ALL.map(|d| ProbeConfig::new(d, DEFAULT_SIZE_MULTIPLIER))
}

/// Tracks, per touched collider, the directions in which it blocks.
#[derive(Debug, Clone)]
pub struct DirectionalBoxCast<C> {
    probes: [ProbeConfig; 4],
    regions: Vec<(Direction, Aabb)>,
    hits: HashMap<C, DirectionMask>,
    buffer: Vec<C>,
    buffer_size: usize,
}

impl<C: Copy + Eq + Hash> Default for DirectionalBoxCast<C> {
    fn default() -> Self {
        Self::new(default_probes())
    }
}

impl<C: Copy + Eq + Hash> DirectionalBoxCast<C> {
    pub fn new(probes: [ProbeConfig; 4]) -> Self {
        Self {
            probes,
            regions: Vec::with_capacity(4),
            hits: HashMap::new(),
            buffer: Vec::with_capacity(DEFAULT_HIT_BUFFER_SIZE),
            buffer_size: DEFAULT_HIT_BUFFER_SIZE,
        }
    }

    pub fn probes(&self) -> &[ProbeConfig; 4] {
        &self.probes
    }

    /// Bound the number of candidates evaluated per recomputation.
    pub fn set_hit_buffer_size(&mut self, size: usize) {
        self.buffer_size = size;
        self.buffer = Vec::with_capacity(size);
    }

    pub fn hit_buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether any tracked collider, or `collider` specifically, was hit in
    /// `direction` on the last recomputation.
    pub fn is_hit(&self, direction: Direction, collider: Option<C>) -> bool {
        match collider {
            Some(c) => self.hits.get(&c).is_some_and(|m| m.contains(direction)),
            None => self.hits.values().any(|m| m.contains(direction)),
        }
    }

    /// Directions recorded for one collider (empty if untracked)
    pub fn hits_for(&self, collider: C) -> DirectionMask {
        self.hits.get(&collider).copied().unwrap_or_default()
    }

    /// Every evaluated collider with its hit directions
    pub fn tracked(&self) -> impl Iterator<Item = (&C, &DirectionMask)> {
        self.hits.iter()
    }

    /// Probe boxes from the last recomputation, for debug drawing
    pub fn probe_regions(&self) -> &[(Direction, Aabb)] {
        &self.regions
    }

    /// Recompute the hit table.
    ///
    /// Candidates listed in `mask` are skipped. When more than the buffer size
    /// remain, the earliest ones in `candidates` order are kept and the rest
    /// are dropped for this recomputation.
    pub fn get_hits<P>(&mut self, backend: &P, reference: &Aabb, candidates: &[C], mask: &[C])
    where
        P: PhysicsBackend<Collider = C>,
    {
        self.regions.clear();
        self.regions
            .extend(self.probes.iter().map(|p| (p.direction, p.region(reference))));

        self.buffer.clear();
        let mut dropped = 0usize;
        for &candidate in candidates {
            if mask.contains(&candidate) || self.buffer.contains(&candidate) {
                continue;
            }
            if self.buffer.len() < self.buffer_size {
                self.buffer.push(candidate);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            debug!(
                "box cast buffer full ({}), dropped {} candidate(s)",
                self.buffer_size, dropped
            );
        }

        self.hits.clear();
        for &candidate in &self.buffer {
            let directions: DirectionMask = self
                .regions
                .iter()
                .filter(|(_, region)| backend.intersects_box(candidate, region))
                .map(|(direction, _)| *direction)
                .collect();
            self.hits.insert(candidate, directions);
        }
    }

    /// Forget a collider entirely. Safe to call for untracked colliders.
    pub fn remove_hit(&mut self, collider: C) {
        self.hits.remove(&collider);
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.regions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedPhysics;

    /// A 1x2 reference box centered at the origin.
    fn reference() -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(0.5, 1.0))
    }

    /// A slab touching `reference` from `direction`, sinking 0.01 into it.
    fn slab(direction: Direction) -> Aabb {
        let r = reference();
        match direction {
            Direction::Down => {
                Aabb::new(Vec2::new(0.0, -r.half_extents.y - 0.49), Vec2::new(3.0, 0.5))
            }
            Direction::Up => {
                Aabb::new(Vec2::new(0.0, r.half_extents.y + 0.49), Vec2::new(3.0, 0.5))
            }
            Direction::Left => {
                Aabb::new(Vec2::new(-r.half_extents.x - 0.49, 0.0), Vec2::new(0.5, 0.9))
            }
            Direction::Right => {
                Aabb::new(Vec2::new(r.half_extents.x + 0.49, 0.0), Vec2::new(0.5, 0.9))
            }
        }
    }

    #[test]
    fn probe_region_sits_against_face() {
        let probe = ProbeConfig::new(Direction::Down, 0.02);
        let region = probe.region(&reference());
        // thickness = 2.0 * 0.02
        assert!((region.half_extents.y - 0.02).abs() < 1e-6);
        assert!((region.max().y - -1.0).abs() < 1e-6);
        // width = 1.0 - 2 * 0.04
        assert!((region.size().x - 0.92).abs() < 1e-6);

        let shifted = probe.with_offset(Vec2::new(0.0, 0.1)).region(&reference());
        assert!((shifted.center.y - region.center.y - 0.1).abs() < 1e-6);
    }

    #[test]
    fn single_direction_hit() {
        for direction in Direction::ALL {
            let mut physics = ScriptedPhysics::new();
            let wall = physics.add_collider(slab(direction));

            let mut cast = DirectionalBoxCast::default();
            cast.get_hits(&physics, &reference(), &[wall], &[]);

            for other in Direction::ALL {
                assert_eq!(
                    cast.is_hit(other, Some(wall)),
                    other == direction,
                    "slab from {direction} probed {other}"
                );
                assert_eq!(cast.is_hit(other, None), other == direction);
            }
        }
    }

    #[test]
    fn squeezed_body_hits_both_sides() {
        let mut physics = ScriptedPhysics::new();
        let crusher = physics.add_collider(Aabb::new(Vec2::ZERO, Vec2::new(0.4, 1.5)));

        let mut cast = DirectionalBoxCast::default();
        cast.get_hits(&physics, &reference(), &[crusher], &[]);

        let hits = cast.hits_for(crusher);
        assert!(hits.contains(Direction::Up));
        assert!(hits.contains(Direction::Down));
        assert!(!hits.contains(Direction::Left));
    }

    #[test]
    fn masked_candidates_are_ignored() {
        let mut physics = ScriptedPhysics::new();
        let floor = physics.add_collider(slab(Direction::Down));

        let mut cast = DirectionalBoxCast::default();
        cast.get_hits(&physics, &reference(), &[floor], &[floor]);
        assert!(!cast.is_hit(Direction::Down, None));
        assert_eq!(cast.tracked().count(), 0);
    }

    #[test]
    fn remove_hit_is_idempotent() {
        let mut physics = ScriptedPhysics::new();
        let floor = physics.add_collider(slab(Direction::Down));
        let mut cast = DirectionalBoxCast::default();
        cast.get_hits(&physics, &reference(), &[floor], &[]);
        assert!(cast.is_hit(Direction::Down, Some(floor)));

        cast.remove_hit(floor);
        assert!(cast.hits_for(floor).is_empty());
        cast.remove_hit(floor);
        assert!(cast.hits_for(floor).is_empty());
        assert!(!cast.is_hit(Direction::Down, None));
    }

    #[test]
    fn recompute_drops_colliders_no_longer_listed() {
        let mut physics = ScriptedPhysics::new();
        let floor = physics.add_collider(slab(Direction::Down));
        let ceiling = physics.add_collider(slab(Direction::Up));

        let mut cast = DirectionalBoxCast::default();
        cast.get_hits(&physics, &reference(), &[floor, ceiling], &[]);
        assert!(cast.is_hit(Direction::Up, None));

        cast.get_hits(&physics, &reference(), &[floor], &[]);
        assert!(!cast.is_hit(Direction::Up, None));
        assert!(cast.is_hit(Direction::Down, Some(floor)));
    }

    #[test]
    fn buffer_overflow_keeps_earliest_candidates() {
        let mut physics = ScriptedPhysics::new();
        let floor = physics.add_collider(slab(Direction::Down));
        let left = physics.add_collider(slab(Direction::Left));
        let right = physics.add_collider(slab(Direction::Right));

        let mut cast = DirectionalBoxCast::default();
        cast.set_hit_buffer_size(2);
        cast.get_hits(&physics, &reference(), &[left, floor, right], &[]);

        assert!(cast.is_hit(Direction::Left, Some(left)));
        assert!(cast.is_hit(Direction::Down, Some(floor)));
        assert!(!cast.is_hit(Direction::Right, None));
        assert_eq!(cast.tracked().count(), 2);
    }

    #[test]
    fn evaluated_colliders_are_tracked_even_without_hits() {
        let mut physics = ScriptedPhysics::new();
        let far = physics.add_collider(Aabb::new(Vec2::new(10.0, 10.0), Vec2::ONE));

        let mut cast = DirectionalBoxCast::default();
        cast.get_hits(&physics, &reference(), &[far], &[]);
        assert_eq!(cast.tracked().count(), 1);
        assert!(cast.hits_for(far).is_empty());
        assert_eq!(cast.probe_regions().len(), 4);
    }
}
