//! Vesper Core - Foundational types for the Vesper toolkit
//!
//! This crate provides the types every other Vesper crate depends on:
//! - `Direction`, `DirectionMask` - Cardinal directions and sets of them
//! - `Aabb` - Axis-aligned boxes used by the directional probes
//! - `Vec2` - Planar vector (re-exported from glam)
//! - Error types and Result alias

mod direction;
mod error;
mod types;

pub use direction::{Direction, DirectionMask};
pub use error::{Result, VesperError};
pub use glam::Vec2;
pub use types::{sign_of, Aabb};
