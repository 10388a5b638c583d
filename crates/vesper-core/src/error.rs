//! Error types for Vesper

use thiserror::Error;

/// The main error type for Vesper operations
#[derive(Debug, Error)]
pub enum VesperError {
    #[error("Unknown state '{state}' in state machine '{machine}'")]
    UnknownState { machine: String, state: String },

    #[error("Unknown state machine: {0}")]
    UnknownStateMachine(String),

    #[error("Duplicate state machine: {0}")]
    DuplicateStateMachine(String),

    #[error("Actor has no brain assigned")]
    MissingBrain,

    #[error("Rigid body not found: {0}")]
    MissingBody(String),

    #[error("Collider not found: {0}")]
    MissingCollider(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Vesper operations
pub type Result<T> = std::result::Result<T, VesperError>;

impl From<toml::de::Error> for VesperError {
    fn from(err: toml::de::Error) -> Self {
        VesperError::TomlParseError(err.to_string())
    }
}
