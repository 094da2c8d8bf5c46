//! Render options and the image-encoder interface.
//!
//! The virtual file system does not rasterize images itself; it drives an
//! external encoder that turns one decoded raw frame plus its metadata
//! into a finished camera-raw image. This crate holds that interface and
//! the option flags threaded through every render.

mod error;
mod options;

pub use error::RenderError;
pub use options::RenderOptions;

use bytes::Bytes;

use rawvfs_source::{CameraMetadata, FrameMetadata};

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Encodes one decoded raw frame into camera-raw image bytes.
///
/// Encoders are shared across worker threads and must be deterministic:
/// identical inputs produce identical bytes, which is what keeps virtual
/// file sizes stable between the probe encode and later reads.
pub trait FrameEncoder: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn encode(
        &self,
        raw: &[u8],
        frame: &FrameMetadata,
        camera: &CameraMetadata,
        fps: f32,
        frame_index: usize,
        options: RenderOptions,
        scale: u32,
    ) -> RenderResult<Bytes>;
}
