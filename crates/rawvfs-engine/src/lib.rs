//! Virtual file system over raw camera captures.
//!
//! A capture file is presented as a flat, read-only directory: one
//! camera-raw image per presentation slot (duplicated across dropped
//! frames) plus a WAV file holding the capture's audio aligned to the
//! first video frame. Nothing is materialised on disk; image bytes are
//! decoded and encoded on demand by a two-stage worker pipeline, and the
//! audio buffer is built once when the capture is opened.

mod directory;
mod error;
mod pool;
mod renderer;
mod vfs;

pub use directory::{Entry, EntryKind};
pub use error::EngineError;
pub use pool::WorkerPool;
pub use renderer::{ReadComplete, READ_STATUS_FAILED, READ_STATUS_OK};
pub use vfs::VirtualFileSystem;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Worker threads dedicated to capture decoding.
pub const IO_THREADS: usize = 4;

/// Name of the synthesized audio entry.
pub const AUDIO_FILE_NAME: &str = "audio.wav";

/// Extension of synthesized image entries.
pub const IMAGE_EXTENSION: &str = "dng";
