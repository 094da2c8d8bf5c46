//! Error types for the audio module.

use thiserror::Error;

use rawvfs_container::ContainerError;

/// Errors that can occur while building the audio file.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The container writer rejected an operation.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// A sample slice did not match the declared frame count.
    #[error("Sample count mismatch: got {samples} samples for {frames} frames of {channels} channels")]
    SampleCountMismatch {
        samples: usize,
        frames: u64,
        channels: u16,
    },
}
