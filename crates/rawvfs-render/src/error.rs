//! Error types for the render module.

use thiserror::Error;

/// Errors that can occur while encoding an image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The encoder could not process the frame.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// The raw payload did not match the sensor description.
    #[error("Raw payload mismatch: {0}")]
    PayloadMismatch(String),

    /// Unexpected internal failure.
    #[error("Internal render error: {0}")]
    Internal(String),
}
