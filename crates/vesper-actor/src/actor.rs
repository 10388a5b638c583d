//! Actor - a motion body driven by a brain and two state machines
//!
//! The actor composes a [`Character`] (the shared context), a [`Brain`], and a
//! [`StateController`] holding the `FORM` and `STATUS` machines. Each phase
//! runs in a fixed order:
//!
//! - `update`: motion samples grounded state, brain input, flip, brain
//!   update, machines
//! - `fixed_update`: brain, machines, then the motion body's physics step
//! - `late_update`: machines
//! - contacts: blocking contacts feed the motion body first, then the brain;
//!   sensor contacts go to the brain only
//!
//! State changes requested during a phase are applied when it ends.

use crate::brain::{ActorContact, Brain};
use crate::character::Character;
use crate::config::ActorConfig;
use log::{debug, warn};
use vesper_core::{Result, VesperError};
use vesper_physics::{ContactEvent, ContactPhase, MotionBody, PhysicsBackend};
use vesper_runtime::{Phases, State, StateController, StateMachine};

/// Name of the machine tracking the actor's form (appearance, ability set)
pub const FORM: &str = "FORM";

/// Name of the machine tracking the actor's transient condition
pub const STATUS: &str = "STATUS";

/// Request rounds applied per phase before the rest wait for the next phase
const MAX_REQUEST_ROUNDS: usize = 16;

pub struct Actor<P: PhysicsBackend> {
    name: String,
    character: Character<P>,
    brain: Box<dyn Brain<P>>,
    states: StateController<Character<P>>,
    /// FORM and STATUS until `start` registers them
    unregistered: Vec<StateMachine<Character<P>>>,
    interaction: Option<P::Collider>,
}

impl<P: PhysicsBackend> Actor<P> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn character(&self) -> &Character<P> {
        &self.character
    }

    pub fn character_mut(&mut self) -> &mut Character<P> {
        &mut self.character
    }

    pub fn motion(&self) -> &MotionBody<P> {
        self.character.motion()
    }

    pub fn states(&self) -> &StateController<Character<P>> {
        &self.states
    }

    pub fn form_id(&self) -> &str {
        self.character.form_id()
    }

    /// Switch form and notify subscribers synchronously.
    pub fn set_form(&mut self, id: &str) {
        self.character.set_form(id);
    }

    /// Change a machine's state right away, outside any phase.
    pub fn change_state(&mut self, machine: &str, id: &str) -> Result<()> {
        self.states.change_state(machine, id, &mut self.character)
    }

    /// Whether `collider` belongs to this actor
    pub fn owns_collider(&self, collider: P::Collider) -> bool {
        self.character.motion().collider() == collider || self.interaction == Some(collider)
    }

    /// Replace the brain and reset the new one. Returns the old brain.
    pub fn set_brain(&mut self, brain: Box<dyn Brain<P>>) -> Box<dyn Brain<P>> {
        let old = std::mem::replace(&mut self.brain, brain);
        self.brain.reset(&mut self.character);
        self.apply_state_requests();
        old
    }

    /// One-time initialization, before `enable`.
    pub fn awake(&mut self) {
        self.brain.awake(&mut self.character);
        self.apply_state_requests();
    }

    /// Runs right after each simulation step, before its contacts are routed.
    pub fn post_step(&mut self, physics: &mut P) {
        self.character.motion_mut().post_step(physics);
    }

    pub fn draw_gizmos(&mut self) {
        self.brain.draw_gizmos(&self.character);
    }

    /// Route a contact event from the simulation.
    ///
    /// Returns false when none of the actor's colliders is part of the pair.
    pub fn handle_contact(&mut self, physics: &P, event: &ContactEvent<P::Collider>) -> bool {
        let own = self.character.motion().collider();
        let Some(contact) = event
            .perspective(own)
            .or_else(|| self.interaction.and_then(|c| event.perspective(c)))
        else {
            return false;
        };

        // Only the blocking box feeds the motion body
        if contact.sensor || contact.own != own {
            match event.phase {
                ContactPhase::Enter => self.trigger_enter(&contact),
                ContactPhase::Stay => self.trigger_stay(&contact),
                ContactPhase::Exit => self.trigger_exit(&contact),
            }
        } else {
            match event.phase {
                ContactPhase::Enter => self.collision_enter(physics, &contact),
                ContactPhase::Stay => self.collision_stay(physics, &contact),
                ContactPhase::Exit => self.collision_exit(&contact),
            }
        }
        true
    }

    pub fn collision_enter(&mut self, physics: &P, contact: &ActorContact<P>) {
        self.character
            .motion_mut()
            .collision_enter(physics, contact.other);
        self.brain.collision_enter(&mut self.character, contact);
        self.apply_state_requests();
    }

    pub fn collision_stay(&mut self, physics: &P, contact: &ActorContact<P>) {
        self.character
            .motion_mut()
            .collision_stay(physics, contact.other);
        self.brain.collision_stay(&mut self.character, contact);
        self.apply_state_requests();
    }

    pub fn collision_exit(&mut self, contact: &ActorContact<P>) {
        self.character.motion_mut().collision_exit(contact.other);
        self.brain.collision_exit(&mut self.character, contact);
        self.apply_state_requests();
    }

    pub fn trigger_enter(&mut self, contact: &ActorContact<P>) {
        self.brain.trigger_enter(&mut self.character, contact);
        self.apply_state_requests();
    }

    pub fn trigger_stay(&mut self, contact: &ActorContact<P>) {
        self.brain.trigger_stay(&mut self.character, contact);
        self.apply_state_requests();
    }

    pub fn trigger_exit(&mut self, contact: &ActorContact<P>) {
        self.brain.trigger_exit(&mut self.character, contact);
        self.apply_state_requests();
    }

    /// Apply queued state requests in order, including any queued by the
    /// transitions themselves.
    fn apply_state_requests(&mut self) {
        for _ in 0..MAX_REQUEST_ROUNDS {
            let requests = self.character.take_state_requests();
            if requests.is_empty() {
                return;
            }
            for (machine, id) in requests {
                // Rejections are logged by the controller
                let _ = self.states.change_state(&machine, &id, &mut self.character);
            }
        }
        if self.character.has_state_requests() {
            warn!(
                "{}: state requests still queued after {} rounds, deferring to next phase",
                self.name, MAX_REQUEST_ROUNDS
            );
        }
    }
}

impl<P: PhysicsBackend> Phases<P> for Actor<P> {
    fn enable(&mut self, _physics: &mut P) {
        self.brain.on_enable(&mut self.character);
        self.apply_state_requests();
    }

    fn start(&mut self, physics: &mut P) {
        for machine in self.unregistered.drain(..) {
            if let Err(err) = self.states.add_state_machine(machine) {
                warn!("{}: {}", self.name, err);
            }
        }
        debug!("{}: started with machines {:?}", self.name, self.states.machine_names());

        self.brain.start(&mut self.character);
        self.apply_state_requests();
        self.character.motion_mut().flush(physics);
    }

    fn update(&mut self, physics: &mut P) {
        self.character.motion_mut().update(physics);

        self.brain.update_input(&mut self.character);
        self.character.update_flip();
        self.brain.update(&mut self.character);

        self.states.update(&mut self.character);
        self.apply_state_requests();
        self.character.motion_mut().flush(physics);
    }

    fn fixed_update(&mut self, physics: &mut P) {
        self.brain.fixed_update(&mut self.character);

        self.states.fixed_update(&mut self.character);
        self.apply_state_requests();

        self.character.motion_mut().fixed_update(physics);
    }

    fn late_update(&mut self, physics: &mut P) {
        self.states.late_update(&mut self.character);
        self.apply_state_requests();
        self.character.motion_mut().flush(physics);
    }

    fn disable(&mut self, _physics: &mut P) {
        self.brain.on_disable(&mut self.character);
        self.apply_state_requests();
    }
}

/// Assembles an [`Actor`]. A brain is required.
pub struct ActorBuilder<P: PhysicsBackend> {
    name: String,
    config: ActorConfig,
    brain: Option<Box<dyn Brain<P>>>,
    form: StateMachine<Character<P>>,
    status: StateMachine<Character<P>>,
    initial_form: Option<String>,
    interaction: Option<P::Collider>,
}

impl<P: PhysicsBackend> ActorBuilder<P> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: ActorConfig::default(),
            brain: None,
            form: StateMachine::new(FORM),
            status: StateMachine::new(STATUS),
            initial_form: None,
            interaction: None,
        }
    }

    pub fn config(mut self, config: ActorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn brain(self, brain: impl Brain<P> + 'static) -> Self {
        self.boxed_brain(Box::new(brain))
    }

    pub fn boxed_brain(mut self, brain: Box<dyn Brain<P>>) -> Self {
        self.brain = Some(brain);
        self
    }

    pub fn form_state(mut self, id: &str, state: impl State<Character<P>> + 'static) -> Self {
        self.form.add_state(id, state);
        self
    }

    pub fn status_state(mut self, id: &str, state: impl State<Character<P>> + 'static) -> Self {
        self.status.add_state(id, state);
        self
    }

    /// Form id the actor starts with. No FORM state is entered.
    pub fn initial_form(mut self, id: &str) -> Self {
        self.initial_form = Some(id.to_string());
        self
    }

    /// A sensor collider on the same body, kept out of the box cast
    pub fn interaction_collider(mut self, collider: P::Collider) -> Self {
        self.interaction = Some(collider);
        self
    }

    /// Bind the actor to its body and blocking collider.
    ///
    /// Fails without a brain, or if the backend does not know the handles.
    pub fn build(self, physics: &P, body: P::Body, collider: P::Collider) -> Result<Actor<P>> {
        let brain = self.brain.ok_or(VesperError::MissingBrain)?;

        let mut motion = MotionBody::new(physics, body, collider, self.config.motion.clone())?;
        if let Some(sensor) = self.interaction {
            if !physics.has_collider(sensor) {
                return Err(VesperError::MissingCollider(format!("{sensor:?}")));
            }
            motion.add_to_cast_mask(sensor);
        }

        let mut character = Character::new(motion, self.config);
        if let Some(form) = &self.initial_form {
            character.set_form(form);
        }

        Ok(Actor {
            name: self.name,
            character,
            brain,
            states: StateController::new(),
            unregistered: vec![self.form, self.status],
            interaction: self.interaction,
        })
    }
}
