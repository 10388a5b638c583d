//! Brain - the pluggable behavior driving an actor

use crate::character::Character;
use vesper_physics::{Contact, PhysicsBackend};

/// Contact seen from the actor's side, parameterized by backend
pub type ActorContact<P> = Contact<<P as PhysicsBackend>::Collider>;

/// Per-phase behavior of an actor: player input, AI, replay, ...
///
/// Every hook defaults to a no-op. Hooks get the actor's [`Character`]; state
/// changes go through [`Character::request_state`] and apply after the phase.
pub trait Brain<P: PhysicsBackend> {
    /// Sample input into `character.input_axis` and the action flags.
    /// Runs first in every frame.
    fn update_input(&mut self, _character: &mut Character<P>) {}

    fn awake(&mut self, _character: &mut Character<P>) {}
    fn on_enable(&mut self, _character: &mut Character<P>) {}
    fn on_disable(&mut self, _character: &mut Character<P>) {}
    fn start(&mut self, _character: &mut Character<P>) {}
    fn update(&mut self, _character: &mut Character<P>) {}
    fn fixed_update(&mut self, _character: &mut Character<P>) {}

    fn collision_enter(&mut self, _character: &mut Character<P>, _contact: &ActorContact<P>) {}
    fn collision_stay(&mut self, _character: &mut Character<P>, _contact: &ActorContact<P>) {}
    fn collision_exit(&mut self, _character: &mut Character<P>, _contact: &ActorContact<P>) {}

    fn trigger_enter(&mut self, _character: &mut Character<P>, _contact: &ActorContact<P>) {}
    fn trigger_stay(&mut self, _character: &mut Character<P>, _contact: &ActorContact<P>) {}
    fn trigger_exit(&mut self, _character: &mut Character<P>, _contact: &ActorContact<P>) {}

    /// Debug drawing hook; only called when the host draws gizmos
    fn draw_gizmos(&mut self, _character: &Character<P>) {}

    /// Called when this brain replaces another on a live actor
    fn reset(&mut self, _character: &mut Character<P>) {}
}

/// A brain that does nothing; the actor only integrates physics
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleBrain;

impl<P: PhysicsBackend> Brain<P> for IdleBrain {}
