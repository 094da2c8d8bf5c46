//! Error types for the engine.

use thiserror::Error;

use rawvfs_audio::AudioError;
use rawvfs_render::RenderError;
use rawvfs_source::SourceError;

/// Errors that can occur while initialising or serving the file system.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The capture decoder failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Building the audio buffer failed.
    #[error(transparent)]
    Audio(#[from] AudioError),

    /// Image encoding failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
