//! Vesper Actor - Platformer characters
//!
//! An [`Actor`] binds a [`MotionBody`](vesper_physics::MotionBody) to a
//! pluggable [`Brain`] and two named state machines, `FORM` and `STATUS`, and
//! steps them through the engine phases in a fixed order.

mod actor;
mod brain;
mod character;
mod config;

pub use actor::{Actor, ActorBuilder, FORM, STATUS};
pub use brain::{ActorContact, Brain, IdleBrain};
pub use character::Character;
pub use config::ActorConfig;
