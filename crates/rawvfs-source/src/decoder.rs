//! Decoder interface consumed by the virtual file system.

use std::path::Path;

use bytes::Bytes;

use crate::{AudioChunk, SourceResult, Timestamp};

/// A decoder bound to one capture file.
///
/// Implementations hold whatever file handles and demux state they need;
/// the engine never shares one decoder across threads.
pub trait CaptureDecoder: Send {
    /// Timestamps of every video frame in the capture, in container order.
    fn frames(&mut self) -> SourceResult<Vec<Timestamp>>;

    /// Load the raw bytes and per-frame metadata of one frame.
    fn load_frame(&mut self, timestamp: Timestamp) -> SourceResult<(Bytes, serde_json::Value)>;

    /// Load every audio chunk in the capture. Empty when the capture has
    /// no audio track.
    fn load_audio(&mut self) -> SourceResult<Vec<AudioChunk>>;

    /// Audio sample rate in Hz.
    fn audio_sample_rate_hz(&self) -> u32;

    /// Number of interleaved audio channels.
    fn num_audio_channels(&self) -> u16;

    /// Container-level metadata blob.
    fn container_metadata(&self) -> SourceResult<serde_json::Value>;
}

/// Opens decoders for a capture path.
///
/// The engine opens one decoder during initialisation and one per worker
/// thread at render time, so providers must be shareable across threads.
pub trait DecoderProvider: Send + Sync {
    /// Open a new decoder for the capture at `path`.
    fn open(&self, path: &Path) -> SourceResult<Box<dyn CaptureDecoder>>;
}
