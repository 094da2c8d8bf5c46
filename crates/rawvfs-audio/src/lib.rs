//! WAV encoding and audio/video alignment.
//!
//! This crate turns the capture's interleaved PCM chunks into a single
//! in-memory WAV buffer: chunks are first aligned to the first video
//! frame, then framed into a RIFF-family `data` chunk.

mod error;
mod sync;
mod writer;

pub use error::AudioError;
pub use sync::sync_audio;
pub use writer::{frame_rate_fraction, WavEncoder};

/// Result type for audio operations.
pub type AudioResult<T> = Result<T, AudioError>;

/// Bit depth of the produced WAV stream.
pub const BITS_PER_SAMPLE: u16 = 16;
