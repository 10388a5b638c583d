//! Actor tuning loaded from TOML

use serde::{Deserialize, Serialize};
use vesper_core::{Result, VesperError};
use vesper_physics::MotionConfig;

/// Movement tunables of an actor.
///
/// Every field has a default, so a config file only lists what it changes:
/// ```toml
/// land_sprint_speed = 5.0
///
/// [motion]
/// max_velocity = [6.0, 8.0]
/// grounded_policy = "contact_only"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub land_move_speed: f32,
    pub land_sprint_speed: f32,
    pub air_move_speed: f32,
    pub air_sprint_speed: f32,
    pub jump_speed: f32,
    /// Height above the take-off point at which a held jump stops rising
    pub max_jump_height: f32,
    /// Mirror the visual scale on X to match the facing axis
    pub flip_x: bool,
    pub flip_y: bool,
    pub motion: MotionConfig,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            land_move_speed: 0.7,
            land_sprint_speed: 4.2,
            air_move_speed: 0.5,
            air_sprint_speed: 0.75,
            jump_speed: 10.0,
            max_jump_height: 2.4,
            flip_x: true,
            flip_y: true,
            motion: MotionConfig::default(),
        }
    }
}

impl ActorConfig {
    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ActorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Speed for horizontal input given the ground contact and sprint flag
    pub fn move_speed(&self, grounded: bool, sprinting: bool) -> f32 {
        match (grounded, sprinting) {
            (true, false) => self.land_move_speed,
            (true, true) => self.land_sprint_speed,
            (false, false) => self.air_move_speed,
            (false, true) => self.air_sprint_speed,
        }
    }

    /// Reject negative or non-finite speeds and an empty hit buffer.
    pub fn validate(&self) -> Result<()> {
        let speeds = [
            ("land_move_speed", self.land_move_speed),
            ("land_sprint_speed", self.land_sprint_speed),
            ("air_move_speed", self.air_move_speed),
            ("air_sprint_speed", self.air_sprint_speed),
            ("jump_speed", self.jump_speed),
            ("max_jump_height", self.max_jump_height),
        ];
        for (name, value) in speeds {
            if !value.is_finite() || value < 0.0 {
                return Err(VesperError::ConfigError(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.motion.hit_buffer_size == 0 {
            return Err(VesperError::ConfigError(
                "motion.hit_buffer_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesper_core::Vec2;
    use vesper_physics::GroundedPolicy;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ActorConfig::from_toml("").unwrap();
        assert_eq!(config, ActorConfig::default());
        assert_eq!(config.land_sprint_speed, 4.2);
        assert_eq!(config.motion.max_velocity, Vec2::new(5.0, 8.0));
        assert_eq!(config.motion.hit_buffer_size, 20);
    }

    #[test]
    fn partial_override() {
        let config = ActorConfig::from_toml(
            r#"
            jump_speed = 12.5
            flip_y = false

            [motion]
            max_velocity = [6.0, 9.0]
            grounded_policy = "contact_only"
            "#,
        )
        .unwrap();

        assert_eq!(config.jump_speed, 12.5);
        assert!(!config.flip_y);
        assert!(config.flip_x);
        assert_eq!(config.motion.max_velocity, Vec2::new(6.0, 9.0));
        assert_eq!(config.motion.grounded_policy, GroundedPolicy::ContactOnly);
        assert!(config.motion.face_only_on_ground);
    }

    #[test]
    fn negative_speed_rejected() {
        let err = ActorConfig::from_toml("air_move_speed = -1.0").unwrap_err();
        assert!(matches!(err, VesperError::ConfigError(_)));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = ActorConfig::from_toml("jump_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, VesperError::TomlParseError(_)));
    }

    #[test]
    fn move_speed_table() {
        let config = ActorConfig::default();
        assert_eq!(config.move_speed(true, false), 0.7);
        assert_eq!(config.move_speed(true, true), 4.2);
        assert_eq!(config.move_speed(false, false), 0.5);
        assert_eq!(config.move_speed(false, true), 0.75);
    }
}
