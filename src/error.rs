//! Error types for setup paths (configuration and course loading).
//!
//! Gameplay itself has no error paths: traces that miss and actions that are
//! not allowed simply do nothing.

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for `GameConfig`
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its allowed range
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Course (collision geometry) errors
#[derive(Debug, Error)]
pub enum CourseError {
    /// No collision triangles to build a world from
    #[error("Course has no collision geometry")]
    Empty,

    /// parry3d rejected the triangle mesh of a surface
    #[error("Invalid collision mesh for surface {0}")]
    InvalidMesh(usize),

    /// Course has nowhere to put the player
    #[error("Course has no spawn points")]
    NoSpawnPoints,

    /// Course file could not be read
    #[error("Failed to read course file: {0}")]
    Io(#[from] std::io::Error),

    /// Course file is not valid JSON for `CourseDesc`
    #[error("Failed to parse course: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
