//! Error types for the source module.

use thiserror::Error;

use crate::Timestamp;

/// Errors that can occur while reading a capture.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Underlying file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The capture container is malformed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Metadata did not deserialize into the expected shape.
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The requested frame does not exist in the capture.
    #[error("Frame {0} not found")]
    FrameNotFound(Timestamp),

    /// The capture uses a feature this build does not support.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
