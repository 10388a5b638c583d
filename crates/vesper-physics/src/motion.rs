//! Motion body - grounded/airborne movement over an external rigid body.
//!
//! The body accumulates movement intent during the frame, clipped against the
//! directions its [`DirectionalBoxCast`] reports as blocked, and turns the sum
//! into a single force once per physics step. Velocity is clamped per axis to
//! the configured maximum at the end of every physics step.
//!
//! Velocity writes made between physics steps (`set_velocity`) are staged and
//! visible through [`MotionBody::velocity`] immediately; they reach the
//! backend on the next [`MotionBody::flush`] or [`MotionBody::fixed_update`].

use crate::backend::PhysicsBackend;
use crate::box_cast::{default_probes, DirectionalBoxCast, ProbeConfig, DEFAULT_HIT_BUFFER_SIZE};
use log::{trace, warn};
use serde::{Deserialize, Serialize};
use vesper_core::{Direction, Result, Vec2, VesperError};

/// How the per-frame grounded flag is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundedPolicy {
    /// Blocked below and vertical velocity exactly zero, sampled once per
    /// frame. The velocity is a physics-rate quantity read at frame rate, so
    /// the flag can lag the simulation by a frame.
    #[default]
    FrameSampled,
    /// Blocked below, regardless of velocity.
    ContactOnly,
}

impl GroundedPolicy {
    pub fn is_grounded(self, colliding_down: bool, velocity: Vec2) -> bool {
        match self {
            GroundedPolicy::FrameSampled => colliding_down && velocity.y == 0.0,
            GroundedPolicy::ContactOnly => colliding_down,
        }
    }
}

/// Tunables of a [`MotionBody`], set once at configuration time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Per-axis speed limit applied after every physics step
    pub max_velocity: Vec2,
    /// Only turn the facing axis while grounded
    pub face_only_on_ground: bool,
    pub hit_buffer_size: usize,
    pub probes: [ProbeConfig; 4],
    pub grounded_policy: GroundedPolicy,
    /// Re-run the box cast on contact-stay as well as contact-begin
    pub refresh_on_stay: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_velocity: Vec2::new(5.0, 8.0),
            face_only_on_ground: true,
            hit_buffer_size: DEFAULT_HIT_BUFFER_SIZE,
            probes: default_probes(),
            grounded_policy: GroundedPolicy::FrameSampled,
            refresh_on_stay: true,
        }
    }
}

/// Character motion state layered over one rigid body and its box collider.
pub struct MotionBody<P: PhysicsBackend> {
    body: P::Body,
    collider: P::Collider,
    config: MotionConfig,
    box_cast: DirectionalBoxCast<P::Collider>,
    touched: Vec<P::Collider>,
    cast_mask: Vec<P::Collider>,
    move_direction: Vec2,
    face_axis: Vec2,
    grounded: bool,
    position: Vec2,
    velocity: Vec2,
    pending_velocity: Option<Vec2>,
    last_force: Vec2,
}

impl<P: PhysicsBackend> MotionBody<P> {
    /// Bind to `body` and its reference `collider`.
    ///
    /// Fails if the backend knows neither handle. The reference collider is
    /// always part of the cast mask.
    pub fn new(
        backend: &P,
        body: P::Body,
        collider: P::Collider,
        mut config: MotionConfig,
    ) -> Result<Self> {
        if !backend.has_body(body) {
            return Err(VesperError::MissingBody(format!("{body:?}")));
        }
        if !backend.has_collider(collider) {
            return Err(VesperError::MissingCollider(format!("{collider:?}")));
        }

        config.max_velocity = config.max_velocity.abs();
        let mut box_cast = DirectionalBoxCast::new(config.probes);
        box_cast.set_hit_buffer_size(config.hit_buffer_size);

        Ok(Self {
            body,
            collider,
            box_cast,
            touched: Vec::new(),
            cast_mask: vec![collider],
            move_direction: Vec2::ZERO,
            face_axis: Vec2::ZERO,
            grounded: false,
            position: backend
                .collider_bounds(collider)
                .map_or(Vec2::ZERO, |b| b.center),
            velocity: backend.velocity(body).unwrap_or(Vec2::ZERO),
            pending_velocity: None,
            last_force: Vec2::ZERO,
            config,
        })
    }

    /// Exclude another of the owner's colliders (e.g. an interaction sensor)
    /// from the box cast.
    pub fn add_to_cast_mask(&mut self, collider: P::Collider) {
        if !self.cast_mask.contains(&collider) {
            self.cast_mask.push(collider);
        }
    }

    pub fn body(&self) -> P::Body {
        self.body
    }

    pub fn collider(&self) -> P::Collider {
        self.collider
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn box_cast(&self) -> &DirectionalBoxCast<P::Collider> {
        &self.box_cast
    }

    /// Colliders currently in contact, in contact-begin order
    pub fn touched(&self) -> &[P::Collider] {
        &self.touched
    }

    pub fn face_axis(&self) -> Vec2 {
        self.face_axis
    }

    pub fn max_velocity(&self) -> Vec2 {
        self.config.max_velocity
    }

    /// Center of the reference collider, sampled once per frame
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Last known velocity, including a staged `set_velocity`
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Intent accumulated since the last physics step
    pub fn move_direction(&self) -> Vec2 {
        self.move_direction
    }

    /// Force handed to the backend on the last physics step
    pub fn last_applied_force(&self) -> Vec2 {
        self.last_force
    }

    /// Horizontal velocity points against the facing axis.
    pub fn is_changing_direction(&self) -> bool {
        (self.velocity.x > 0.0 && self.is_facing(Direction::Left))
            || (self.velocity.x < 0.0 && self.is_facing(Direction::Right))
    }

    /// Blocked in `direction` by any touched collider, or by `collider`.
    pub fn is_colliding(&self, direction: Direction, collider: Option<P::Collider>) -> bool {
        self.box_cast.is_hit(direction, collider)
    }

    pub fn is_moving(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.velocity.y > 0.0,
            Direction::Down => self.velocity.y < 0.0,
            Direction::Left => self.velocity.x < 0.0,
            Direction::Right => self.velocity.x > 0.0,
        }
    }

    pub fn is_moving_any(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    pub fn is_facing(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.face_axis.y > 0.0,
            Direction::Down => self.face_axis.y < 0.0,
            Direction::Left => self.face_axis.x < 0.0,
            Direction::Right => self.face_axis.x > 0.0,
        }
    }

    /// Add movement intent for the next physics step.
    ///
    /// Components pointing into a blocked direction are dropped before the
    /// vector joins the accumulator; each call is clipped on its own.
    pub fn move_by(&mut self, mut direction: Vec2) {
        if direction.y > 0.0 && self.is_colliding(Direction::Up, None) {
            direction.y = 0.0;
        }
        if direction.y < 0.0 && self.is_colliding(Direction::Down, None) {
            direction.y = 0.0;
        }
        if direction.x < 0.0 && self.is_colliding(Direction::Left, None) {
            direction.x = 0.0;
        }
        if direction.x > 0.0 && self.is_colliding(Direction::Right, None) {
            direction.x = 0.0;
        }

        self.move_direction += direction;
    }

    /// Overwrite the body's velocity, bypassing intent.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.pending_velocity = Some(velocity);
    }

    /// Push a staged velocity write to the backend.
    pub fn flush(&mut self, backend: &mut P) {
        if let Some(velocity) = self.pending_velocity.take() {
            backend.set_velocity(self.body, velocity);
        }
    }

    /// Per-frame phase: sample position and velocity, recompute the
    /// grounded flag.
    pub fn update(&mut self, backend: &P) {
        if let Some(bounds) = backend.collider_bounds(self.collider) {
            self.position = bounds.center;
        }
        if self.pending_velocity.is_none() {
            if let Some(velocity) = backend.velocity(self.body) {
                self.velocity = velocity;
            }
        }
        self.grounded = self
            .config
            .grounded_policy
            .is_grounded(self.is_colliding(Direction::Down, None), self.velocity);
    }

    /// Physics phase: apply and reset intent, then clamp velocity.
    pub fn fixed_update(&mut self, backend: &mut P) {
        self.flush(backend);
        if let Some(velocity) = backend.velocity(self.body) {
            self.velocity = velocity;
        }

        self.last_force = Vec2::ZERO;
        if self.move_direction != Vec2::ZERO {
            if !self.config.face_only_on_ground || self.grounded {
                self.face_axis = face_toward(self.face_axis, self.move_direction);
            }

            backend.add_force(self.body, self.move_direction);
            trace!("{:?}: force {:?}", self.body, self.move_direction);
            self.last_force = self.move_direction;
            self.move_direction = Vec2::ZERO;
        }

        self.clamp_velocity(backend);
    }

    /// After the simulation step: clamp the velocity the step integrated.
    pub fn post_step(&mut self, backend: &mut P) {
        if let Some(velocity) = backend.velocity(self.body) {
            self.velocity = velocity;
        }
        self.clamp_velocity(backend);
    }

    fn clamp_velocity(&mut self, backend: &mut P) {
        let max = self.config.max_velocity;
        let clamped = Vec2::new(
            clamp_axis(self.velocity.x, max.x),
            clamp_axis(self.velocity.y, max.y),
        );
        if clamped != self.velocity {
            backend.set_velocity(self.body, clamped);
            self.velocity = clamped;
        }
        debug_assert!(self.velocity.x.abs() <= max.x && self.velocity.y.abs() <= max.y);
    }

    /// A blocking contact began.
    pub fn collision_enter(&mut self, backend: &P, other: P::Collider) {
        if !self.touched.contains(&other) {
            self.touched.push(other);
        }
        self.refresh_hits(backend);
    }

    /// A blocking contact persists.
    pub fn collision_stay(&mut self, backend: &P, other: P::Collider) {
        if !self.config.refresh_on_stay {
            return;
        }
        if !self.touched.contains(&other) {
            self.touched.push(other);
        }
        self.refresh_hits(backend);
    }

    /// A blocking contact ended.
    pub fn collision_exit(&mut self, other: P::Collider) {
        self.touched.retain(|c| *c != other);
        self.box_cast.remove_hit(other);
    }

    fn refresh_hits(&mut self, backend: &P) {
        let Some(reference) = backend.collider_bounds(self.collider) else {
            warn!("{:?}: reference collider vanished, skipping box cast", self.collider);
            return;
        };
        self.box_cast
            .get_hits(backend, &reference, &self.touched, &self.cast_mask);
    }
}

/// New facing axis after moving along `direction`: each component turns to
/// the sign of the movement, or keeps its value where movement is zero.
fn face_toward(face: Vec2, direction: Vec2) -> Vec2 {
    let turn = |current: f32, toward: f32| {
        if toward < 0.0 {
            -1.0
        } else if toward > 0.0 {
            1.0
        } else {
            current
        }
    };
    Vec2::new(turn(face.x, direction.x), turn(face.y, direction.y))
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    if value.abs() > max {
        max * value.signum()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedBody, ScriptedCollider, ScriptedPhysics};
    use vesper_core::Aabb;

    struct Rig {
        physics: ScriptedPhysics,
        body: ScriptedBody,
        motion: MotionBody<ScriptedPhysics>,
    }

    /// A 1x2 character standing at the origin with no contacts yet.
    fn setup(config: MotionConfig) -> Rig {
        let mut physics = ScriptedPhysics::new();
        let body = physics.add_body(Vec2::ZERO);
        let collider = physics.add_collider(Aabb::new(Vec2::ZERO, Vec2::new(0.5, 1.0)));
        let motion = MotionBody::new(&physics, body, collider, config).unwrap();
        Rig {
            physics,
            body,
            motion,
        }
    }

    impl Rig {
        fn touch(&mut self, bounds: Aabb) -> ScriptedCollider {
            let collider = self.physics.add_collider(bounds);
            self.motion.collision_enter(&self.physics, collider);
            collider
        }

        fn floor(&mut self) -> ScriptedCollider {
            self.touch(Aabb::new(Vec2::new(0.0, -1.49), Vec2::new(5.0, 0.5)))
        }

        fn left_wall(&mut self) -> ScriptedCollider {
            self.touch(Aabb::new(Vec2::new(-0.99, 0.0), Vec2::new(0.5, 0.9)))
        }
    }

    #[test]
    fn missing_handles_fail_fast() {
        let mut physics = ScriptedPhysics::new();
        let body = physics.add_body(Vec2::ZERO);
        let collider = physics.add_collider(Aabb::default());

        let err = MotionBody::new(&physics, ScriptedBody(99), collider, MotionConfig::default());
        assert!(matches!(err, Err(VesperError::MissingBody(_))));

        let err = MotionBody::new(&physics, body, ScriptedCollider(99), MotionConfig::default());
        assert!(matches!(err, Err(VesperError::MissingCollider(_))));
    }

    #[test]
    fn blocked_down_drops_vertical_intent() {
        let mut rig = setup(MotionConfig::default());
        rig.floor();
        rig.motion.update(&rig.physics);
        assert!(rig.motion.is_grounded());

        rig.motion.move_by(Vec2::new(0.0, -1.0));
        rig.motion.move_by(Vec2::new(1.0, 0.0));
        rig.motion.fixed_update(&mut rig.physics);

        assert_eq!(rig.physics.forces(rig.body), &[Vec2::new(1.0, 0.0)]);
        assert_eq!(rig.motion.face_axis(), Vec2::new(1.0, 0.0));
        assert_eq!(rig.motion.last_applied_force(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn intent_is_clipped_per_call() {
        let mut rig = setup(MotionConfig::default());
        rig.left_wall();

        rig.motion.move_by(Vec2::new(2.0, 0.0));
        rig.motion.move_by(Vec2::new(-3.0, 1.0));
        // Clipping the sum (-1, 1) would have dropped x entirely.
        assert_eq!(rig.motion.move_direction(), Vec2::new(2.0, 1.0));

        rig.motion.fixed_update(&mut rig.physics);
        assert_eq!(rig.physics.net_force(rig.body), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn intent_resets_after_each_step() {
        let mut rig = setup(MotionConfig::default());
        rig.motion.move_by(Vec2::new(1.0, 0.0));
        rig.motion.fixed_update(&mut rig.physics);
        rig.physics.integrate(0.0);

        rig.motion.fixed_update(&mut rig.physics);
        assert!(rig.physics.forces(rig.body).is_empty());
        assert_eq!(rig.motion.move_direction(), Vec2::ZERO);
        assert_eq!(rig.motion.last_applied_force(), Vec2::ZERO);
    }

    #[test]
    fn velocity_is_clamped_with_sign() {
        let mut rig = setup(MotionConfig::default());
        for (input, expected) in [
            (Vec2::new(9.0, -20.0), Vec2::new(5.0, -8.0)),
            (Vec2::new(-9.0, 3.0), Vec2::new(-5.0, 3.0)),
            (Vec2::new(4.0, 8.0), Vec2::new(4.0, 8.0)),
        ] {
            rig.physics.set_velocity(rig.body, input);
            rig.motion.fixed_update(&mut rig.physics);
            assert_eq!(rig.physics.velocity(rig.body), Some(expected));
            assert_eq!(rig.motion.velocity(), expected);
        }
    }

    #[test]
    fn velocity_is_clamped_after_the_step() {
        let mut rig = setup(MotionConfig::default());
        rig.motion.move_by(Vec2::new(20.0, 0.0));
        rig.motion.fixed_update(&mut rig.physics);
        assert_eq!(rig.physics.velocity(rig.body), Some(Vec2::ZERO));

        rig.physics.integrate(0.5);
        assert_eq!(rig.physics.velocity(rig.body), Some(Vec2::new(10.0, 0.0)));

        rig.motion.post_step(&mut rig.physics);
        assert_eq!(rig.physics.velocity(rig.body), Some(Vec2::new(5.0, 0.0)));
        assert_eq!(rig.motion.velocity(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn negative_max_velocity_is_taken_as_magnitude() {
        let config = MotionConfig {
            max_velocity: Vec2::new(-2.0, -3.0),
            ..MotionConfig::default()
        };
        let rig = setup(config);
        assert_eq!(rig.motion.max_velocity(), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn facing_waits_for_ground_when_configured() {
        let mut rig = setup(MotionConfig::default());
        rig.motion.update(&rig.physics);
        assert!(!rig.motion.is_grounded());

        rig.motion.move_by(Vec2::new(-1.0, 0.0));
        rig.motion.fixed_update(&mut rig.physics);
        assert_eq!(rig.motion.face_axis(), Vec2::ZERO);

        let mut rig = setup_anywhere();
        rig.motion.move_by(Vec2::new(-1.0, 1.0));
        rig.motion.fixed_update(&mut rig.physics);
        assert_eq!(rig.motion.face_axis(), Vec2::new(-1.0, 1.0));
    }

    fn setup_anywhere() -> Rig {
        setup(MotionConfig {
            face_only_on_ground: false,
            ..MotionConfig::default()
        })
    }

    #[test]
    fn facing_keeps_axis_without_movement() {
        let mut rig = setup_anywhere();
        rig.motion.move_by(Vec2::new(1.0, -1.0));
        rig.motion.fixed_update(&mut rig.physics);
        rig.motion.move_by(Vec2::new(0.0, 1.0));
        rig.motion.fixed_update(&mut rig.physics);
        assert_eq!(rig.motion.face_axis(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn grounded_requires_zero_vertical_velocity() {
        let mut rig = setup(MotionConfig::default());
        rig.floor();
        rig.physics.set_velocity(rig.body, Vec2::new(0.0, -0.5));
        rig.motion.update(&rig.physics);
        assert!(!rig.motion.is_grounded());

        let mut rig = setup(MotionConfig {
            grounded_policy: GroundedPolicy::ContactOnly,
            ..MotionConfig::default()
        });
        rig.floor();
        rig.physics.set_velocity(rig.body, Vec2::new(0.0, -0.5));
        rig.motion.update(&rig.physics);
        assert!(rig.motion.is_grounded());
    }

    #[test]
    fn changing_direction_against_facing() {
        let mut rig = setup_anywhere();
        rig.motion.move_by(Vec2::new(1.0, 0.0));
        rig.motion.fixed_update(&mut rig.physics);
        assert!(rig.motion.is_facing(Direction::Right));

        rig.physics.set_velocity(rig.body, Vec2::new(-2.0, 0.0));
        rig.motion.update(&rig.physics);
        assert!(rig.motion.is_changing_direction());
        assert!(rig.motion.is_moving(Direction::Left));
        assert!(rig.motion.is_moving_any());

        rig.physics.set_velocity(rig.body, Vec2::new(2.0, 0.0));
        rig.motion.update(&rig.physics);
        assert!(!rig.motion.is_changing_direction());
    }

    #[test]
    fn set_velocity_is_staged_until_flush() {
        let mut rig = setup(MotionConfig::default());
        rig.motion.set_velocity(Vec2::new(0.0, 10.0));
        assert_eq!(rig.motion.velocity(), Vec2::new(0.0, 10.0));
        assert_eq!(rig.physics.velocity(rig.body), Some(Vec2::ZERO));

        // A frame sample must not overwrite the staged write.
        rig.motion.update(&rig.physics);
        assert_eq!(rig.motion.velocity(), Vec2::new(0.0, 10.0));

        rig.motion.flush(&mut rig.physics);
        assert_eq!(rig.physics.velocity(rig.body), Some(Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn jump_velocity_is_clamped_on_next_step() {
        let mut rig = setup(MotionConfig::default());
        rig.motion.set_velocity(Vec2::new(0.0, 10.0));
        rig.motion.fixed_update(&mut rig.physics);
        assert_eq!(rig.physics.velocity(rig.body), Some(Vec2::new(0.0, 8.0)));
    }

    #[test]
    fn collision_exit_unblocks() {
        let mut rig = setup(MotionConfig::default());
        let floor = rig.floor();
        assert!(rig.motion.is_colliding(Direction::Down, Some(floor)));

        rig.motion.collision_exit(floor);
        assert!(!rig.motion.is_colliding(Direction::Down, None));
        assert!(rig.motion.touched().is_empty());

        rig.motion.move_by(Vec2::new(0.0, -1.0));
        assert_eq!(rig.motion.move_direction(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn own_colliders_never_block() {
        let mut rig = setup(MotionConfig::default());
        let own = rig.motion.collider();
        rig.motion.collision_enter(&rig.physics, own);

        let sensor = rig.physics.add_collider(Aabb::new(Vec2::ZERO, Vec2::new(1.0, 1.5)));
        rig.motion.add_to_cast_mask(sensor);
        rig.motion.collision_enter(&rig.physics, sensor);

        for direction in Direction::ALL {
            assert!(!rig.motion.is_colliding(direction, None));
        }
    }

    #[test]
    fn stay_refresh_picks_up_late_overlap() {
        let mut rig = setup(MotionConfig::default());
        let floor = rig.touch(Aabb::new(Vec2::new(0.0, -1.6), Vec2::new(5.0, 0.5)));
        assert!(!rig.motion.is_colliding(Direction::Down, None));

        rig.physics
            .place_collider(floor, Aabb::new(Vec2::new(0.0, -1.49), Vec2::new(5.0, 0.5)));
        rig.motion.collision_stay(&rig.physics, floor);
        assert!(rig.motion.is_colliding(Direction::Down, Some(floor)));
    }

    #[test]
    fn stay_refresh_can_be_disabled() {
        let mut rig = setup(MotionConfig {
            refresh_on_stay: false,
            ..MotionConfig::default()
        });
        let floor = rig.touch(Aabb::new(Vec2::new(0.0, -1.6), Vec2::new(5.0, 0.5)));
        rig.physics
            .place_collider(floor, Aabb::new(Vec2::new(0.0, -1.49), Vec2::new(5.0, 0.5)));
        rig.motion.collision_stay(&rig.physics, floor);
        assert!(!rig.motion.is_colliding(Direction::Down, None));
    }

    #[test]
    fn config_from_toml() {
        let config: MotionConfig = toml::from_str(
            r#"
            max_velocity = [6.0, 9.0]
            grounded_policy = "contact_only"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_velocity, Vec2::new(6.0, 9.0));
        assert_eq!(config.grounded_policy, GroundedPolicy::ContactOnly);
        assert!(config.face_only_on_ground);
        assert_eq!(config.hit_buffer_size, DEFAULT_HIT_BUFFER_SIZE);
    }

    #[test]
    fn position_sampled_per_frame() {
        let mut rig = setup(MotionConfig::default());
        let collider = rig.motion.collider();
        assert_eq!(rig.motion.position(), Vec2::ZERO);

        rig.physics
            .place_collider(collider, Aabb::new(Vec2::new(2.0, 3.0), Vec2::new(0.5, 1.0)));
        assert_eq!(rig.motion.position(), Vec2::ZERO);

        rig.motion.update(&rig.physics);
        assert_eq!(rig.motion.position(), Vec2::new(2.0, 3.0));
    }
}
