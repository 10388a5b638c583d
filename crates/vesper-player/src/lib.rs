//! Vesper Player - headless level runner
//!
//! Loads a level file, spawns its actors into a Rapier 2D world, and steps
//! them through the frame and physics phases with a fixed-timestep clock.

pub mod brains;
pub mod level;
pub mod logging;
mod stage;
pub mod states;

pub use level::LevelFile;
pub use stage::Stage;
