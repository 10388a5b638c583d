//! Vesper Physics - character motion on top of a rigid-body simulation
//!
//! - `PhysicsBackend` - the seam to the external simulation (velocity, force,
//!   collider bounds, box overlap)
//! - `DirectionalBoxCast` - four cardinal probes around a reference box that
//!   track which touched colliders block which directions
//! - `MotionBody` - grounded/facing state, intent accumulation, velocity clamp
//! - `PhysicsWorld` - Rapier 2D implementation of the backend with contact events

pub mod backend;
pub mod box_cast;
pub mod contact;
pub mod motion;
pub mod world;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::PhysicsBackend;
pub use box_cast::{DirectionalBoxCast, ProbeConfig};
pub use contact::{Contact, ContactEvent, ContactPhase};
pub use motion::{GroundedPolicy, MotionBody, MotionConfig};
pub use world::{BodySettings, CharacterHandles, PhysicsWorld};
