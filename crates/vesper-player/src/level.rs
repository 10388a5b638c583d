//! TOML level description: platforms, form zones, and actor spawns

use serde::{Deserialize, Serialize};
use std::path::Path;
use vesper_actor::ActorConfig;
use vesper_core::{Result, Vec2, VesperError};
use vesper_physics::BodySettings;

/// A level file.
///
/// ```toml
/// name = "ledges"
///
/// [[platforms]]
/// center = [0.0, -0.5]
/// half_extents = [20.0, 0.5]
///
/// [[zones]]
/// center = [4.0, 1.0]
/// half_extents = [0.5, 2.0]
/// form = "ember"
///
/// [[actors]]
/// name = "droplet"
/// position = [0.0, 2.0]
/// brain = { kind = "patrol", span = 6.0 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    pub name: String,
    /// Overrides the world's default gravity
    #[serde(default)]
    pub gravity: Option<Vec2>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub zones: Vec<FormZone>,
    #[serde(default)]
    pub actors: Vec<ActorSpawn>,
}

/// Static blocking box
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub center: Vec2,
    pub half_extents: Vec2,
}

/// Sensor box that switches an actor's form while it passes through
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormZone {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub form: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorSpawn {
    pub name: String,
    pub position: Vec2,
    #[serde(default = "default_half_extents")]
    pub half_extents: Vec2,
    #[serde(default = "default_form")]
    pub form: String,
    #[serde(default)]
    pub brain: BrainSpec,
    #[serde(default)]
    pub config: ActorConfig,
    #[serde(default)]
    pub body: BodySettings,
}

/// Which built-in brain drives a spawned actor
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrainSpec {
    /// No input; the actor only falls and settles
    #[default]
    Idle,
    /// Walk back and forth, turning at walls or `span` away from the spawn
    Patrol {
        #[serde(default = "default_span")]
        span: f32,
        /// Frames between jump attempts; 0 never jumps
        #[serde(default)]
        jump_every: u32,
        #[serde(default)]
        sprint: bool,
    },
}

fn default_half_extents() -> Vec2 {
    Vec2::new(0.5, 1.0)
}

fn default_form() -> String {
    "droplet".to_string()
}

fn default_span() -> f32 {
    4.0
}

impl LevelFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VesperError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let level: LevelFile = toml::from_str(content)?;

        for (i, platform) in level.platforms.iter().enumerate() {
            if platform.half_extents.cmple(Vec2::ZERO).any() {
                return Err(VesperError::ConfigError(format!(
                    "Level '{}' platform {} has non-positive half extents",
                    level.name, i
                )));
            }
        }
        for spawn in &level.actors {
            if spawn.half_extents.cmple(Vec2::ZERO).any() {
                return Err(VesperError::ConfigError(format!(
                    "Level '{}' actor '{}' has non-positive half extents",
                    level.name, spawn.name
                )));
            }
            spawn.config.validate()?;
        }
        Ok(level)
    }
}
