//! Error types for the container module.

use thiserror::Error;

/// Errors that can occur while writing a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A size exceeded the range its field can represent.
    #[error("Size overflow: {0}")]
    Overflow(String),

    /// An operation was issued out of order.
    #[error("Invalid writer state: {0}")]
    InvalidState(String),

    /// The requested sample format cannot be written.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error from the sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
