//! Error types for the collaborators around the simulation
//!
//! The simulation itself never fails: off-mask queries, stalled particles and
//! unresolved contacts are all handled by policy. These errors cover what has
//! to be checked before a world can be built.

use std::io;

use thiserror::Error;

/// Errors loading or validating [`crate::Settings`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read
    #[error("config IO error: {0}")]
    Io(#[from] io::Error),
    /// Settings file is not valid JSON for [`crate::Settings`]
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Settings parsed but describe an unusable scene
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors loading the obstacle bitmap or building its mask
#[derive(Debug, Error)]
pub enum BitmapError {
    /// Image could not be opened or decoded
    #[error("obstacle image error: {0}")]
    Image(#[from] image::ImageError),
    /// Raw pixel or cell buffer does not match the stated dimensions
    #[error("buffer holds {actual} cells, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}
