//! Capture-side types and the decoder interface.
//!
//! This crate defines the value types shared by every rawvfs crate
//! (timestamps, audio chunks, camera metadata) and the trait a capture
//! decoder must implement to be mounted as a virtual file tree.

mod chunk;
mod decoder;
mod error;
mod metadata;

pub use chunk::AudioChunk;
pub use decoder::{CaptureDecoder, DecoderProvider};
pub use error::SourceError;
pub use metadata::{CameraMetadata, FrameMetadata};

/// Nanoseconds on the capture's monotonic clock.
pub type Timestamp = i64;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;
