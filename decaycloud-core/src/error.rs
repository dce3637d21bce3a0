//! Error types for decaycloud

use thiserror::Error;

/// Main error type for decaycloud operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pose transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors reported by a pose-transform service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Unknown frame: {frame}")]
    UnknownFrame { frame: String },

    #[error("Cannot transform from '{source_frame}' to '{target_frame}': {message}")]
    Lookup {
        source_frame: String,
        target_frame: String,
        message: String,
    },

    #[error("Transformed {actual} points, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Result type alias for decaycloud operations
pub type Result<T> = std::result::Result<T, Error>;
