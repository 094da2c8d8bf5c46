//! RIFF-family container writing.
//!
//! This crate emits WAVE containers in the RIFF/BW64/RF64 family: the
//! chunked little-endian layout, the `fmt ` header, and the `ds64` 64-bit
//! size escape used once a payload outgrows 32-bit chunk sizes. It also
//! carries the PCM sample packing shared with any consumer that needs
//! float↔int conversion.

mod error;
mod fmt;
mod pcm;
mod riff;

pub use error::ContainerError;
pub use fmt::{ExtensibleInfo, FormatInfo};
pub use pcm::{decode_pcm_f32, encode_pcm_f32, encode_pcm_i16};
pub use riff::{four_cc, RiffFormat, RiffWriter};

/// Result type for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Entries reserved up front in the `ds64` size table.
pub const DS64_TABLE_CAPACITY: u32 = 2;
