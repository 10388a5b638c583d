//! FORM and STATUS states used by spawned actors

use log::debug;
use vesper_actor::{ActorBuilder, Character, STATUS};
use vesper_core::Direction;
use vesper_physics::PhysicsBackend;
use vesper_runtime::State;

/// Status ids, in the order they are registered
pub const STATUSES: [&str; 4] = ["idle", "run", "jump", "fall"];

/// Entering a form state switches the character's form id to match.
pub struct FormState {
    id: String,
}

impl FormState {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl<P: PhysicsBackend> State<Character<P>> for FormState {
    fn on_enter(&mut self, character: &mut Character<P>) {
        if character.form_id() != self.id {
            character.set_form(&self.id);
        }
    }
}

/// A status that hands over to whichever status the motion now calls for.
pub struct StatusState {
    id: &'static str,
}

impl StatusState {
    pub fn new(id: &'static str) -> Self {
        Self { id }
    }
}

impl<P: PhysicsBackend> State<Character<P>> for StatusState {
    fn on_enter(&mut self, character: &mut Character<P>) {
        debug!(
            "status {} (v = {:?})",
            self.id,
            character.motion().velocity()
        );
    }

    fn on_update(&mut self, character: &mut Character<P>) {
        let next = status_for(character);
        if next != self.id {
            character.request_state(STATUS, next);
        }
    }
}

/// The status matching the character's current motion
pub fn status_for<P: PhysicsBackend>(character: &Character<P>) -> &'static str {
    let motion = character.motion();
    if !motion.is_grounded() {
        if motion.is_moving(Direction::Up) {
            "jump"
        } else {
            "fall"
        }
    } else if motion.is_moving(Direction::Left) || motion.is_moving(Direction::Right) {
        "run"
    } else {
        "idle"
    }
}

/// Register one FORM state per form id and the four STATUS states.
pub fn with_stage_states<P, S>(mut builder: ActorBuilder<P>, forms: &[S]) -> ActorBuilder<P>
where
    P: PhysicsBackend,
    S: AsRef<str>,
{
    for form in forms {
        builder = builder.form_state(form.as_ref(), FormState::new(form.as_ref()));
    }
    for status in STATUSES {
        builder = builder.status_state(status, StatusState::new(status));
    }
    builder
}
