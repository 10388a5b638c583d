//! Vesper Runtime - Tick-driven building blocks
//!
//! Provides the pieces an explicit phase scheduler is assembled from:
//! - `State` / `StateMachine` / `StateController` - named single-active-state
//!   machines stepped once per phase for a shared owning context
//! - `Signal` - synchronous, ordered observer list
//! - `GameClock` - fixed-timestep accumulator for deterministic physics
//! - `Phases` - trait for anything stepped by the frame and physics loops

mod clock;
mod signal;
mod state;
mod system;

pub use clock::GameClock;
pub use signal::{Signal, SubscriptionId};
pub use state::{State, StateController, StateMachine};
pub use system::Phases;
