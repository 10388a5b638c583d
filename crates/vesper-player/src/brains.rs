//! Built-in brains for headless levels

use log::{debug, trace};
use std::collections::HashMap;
use vesper_actor::{ActorContact, Brain, Character, FORM};
use vesper_core::{Direction, Vec2};
use vesper_physics::PhysicsBackend;

/// Walks back and forth and jumps on a timer.
///
/// Turns around at walls or once it is `span` away from where it started.
/// Jumps hold the jump speed until the character has risen
/// `max_jump_height` above the take-off point or hits a ceiling. Touching a
/// form zone requests that form.
pub struct PatrolBrain<P: PhysicsBackend> {
    span: f32,
    jump_every: u32,
    sprint: bool,
    zones: HashMap<P::Collider, String>,
    origin_x: f32,
    heading: f32,
    frame: u32,
}

impl<P: PhysicsBackend> PatrolBrain<P> {
    pub fn new(span: f32, jump_every: u32, sprint: bool) -> Self {
        Self {
            span: span.abs(),
            jump_every,
            sprint,
            zones: HashMap::new(),
            origin_x: 0.0,
            heading: 1.0,
            frame: 0,
        }
    }

    /// Sensor colliders that switch the form, keyed by collider
    pub fn with_zones(mut self, zones: HashMap<P::Collider, String>) -> Self {
        self.zones = zones;
        self
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    fn turn_if_needed(&mut self, character: &Character<P>) {
        let motion = character.motion();
        let x = motion.position().x;
        if self.heading > 0.0
            && (x >= self.origin_x + self.span || motion.is_colliding(Direction::Right, None))
        {
            self.heading = -1.0;
            debug!("patrol turns left at x = {x:.2}");
        } else if self.heading < 0.0
            && (x <= self.origin_x - self.span || motion.is_colliding(Direction::Left, None))
        {
            self.heading = 1.0;
            debug!("patrol turns right at x = {x:.2}");
        }
    }
}

impl<P: PhysicsBackend> Brain<P> for PatrolBrain<P> {
    fn start(&mut self, character: &mut Character<P>) {
        self.origin_x = character.motion().position().x;
    }

    fn update_input(&mut self, character: &mut Character<P>) {
        self.frame = self.frame.wrapping_add(1);
        self.turn_if_needed(character);

        character.input_axis = Vec2::new(self.heading, 0.0);
        character.is_sprinting = self.sprint;

        let wants_jump = self.jump_every > 0 && self.frame % self.jump_every == 0;
        if wants_jump && !character.is_jumping && character.motion().is_grounded() {
            character.is_jumping = true;
            character.last_jump_pos = character.motion().position();
        }
    }

    fn update(&mut self, character: &mut Character<P>) {
        let speed = character.move_speed();
        let input = character.input_axis;
        character.motion_mut().move_by(Vec2::new(input.x * speed, 0.0));

        if character.is_jumping {
            let motion = character.motion();
            let risen = motion.position().y - character.last_jump_pos.y;
            if risen >= character.config().max_jump_height
                || motion.is_colliding(Direction::Up, None)
            {
                character.is_jumping = false;
            } else {
                let vx = motion.velocity().x;
                let jump_speed = character.config().jump_speed;
                character
                    .motion_mut()
                    .set_velocity(Vec2::new(vx, jump_speed));
            }
        }
    }

    fn trigger_enter(&mut self, character: &mut Character<P>, contact: &ActorContact<P>) {
        if let Some(form) = self.zones.get(&contact.other) {
            if character.form_id() != form {
                character.request_state(FORM, form);
            }
        }
    }

    fn draw_gizmos(&mut self, character: &Character<P>) {
        for (direction, region) in character.motion().box_cast().probe_regions() {
            trace!(
                "probe {direction}: min {:?} max {:?}",
                region.min(),
                region.max()
            );
        }
    }

    fn reset(&mut self, character: &mut Character<P>) {
        self.frame = 0;
        self.heading = 1.0;
        self.origin_x = character.motion().position().x;
        character.is_jumping = false;
    }
}
