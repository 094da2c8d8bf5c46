//! Asynchronous frame rendering.
//!
//! A frame read runs as a two-stage pipeline: the I/O pool locates and
//! decodes the source frame with a worker-local decoder, and the
//! processing pool encodes the image and slices out the requested byte
//! range. The stages are linked by a single-use channel so stage 2
//! consumes stage 1's output exactly once. Faults never reach the caller
//! directly; they surface as a failed completion callback.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use crossbeam_channel::Receiver;
use tracing::{debug, error};

use rawvfs_render::{FrameEncoder, RenderOptions};
use rawvfs_source::{
    CameraMetadata, CaptureDecoder, DecoderProvider, FrameMetadata, SourceError, Timestamp,
};

use crate::pool::WorkerPool;
use crate::{EngineError, EngineResult};

/// Completion callback for an asynchronous read: the delivered bytes and
/// a status code. May run on any processing-pool thread.
pub type ReadComplete = Box<dyn FnOnce(Bytes, i32) + Send + 'static>;

/// Status delivered on a successful read (including zero-byte reads past
/// the end of the image).
pub const READ_STATUS_OK: i32 = 0;

/// Status delivered when decoding or encoding failed.
pub const READ_STATUS_FAILED: i32 = -1;

/// Output of the decode stage, handed to the encode stage.
struct DecodedFrame {
    frame_index: usize,
    camera: CameraMetadata,
    frame: FrameMetadata,
    raw: Bytes,
}

thread_local! {
    /// Worker-local decoders keyed by capture path. At most one open
    /// decoder per (worker, path); torn down with the worker thread.
    static DECODERS: RefCell<HashMap<PathBuf, Box<dyn CaptureDecoder>>> =
        RefCell::new(HashMap::new());
}

/// Renders image-entry byte ranges through the worker pools.
pub struct FrameRenderer {
    io_pool: Arc<WorkerPool>,
    processing_pool: Arc<WorkerPool>,
    provider: Arc<dyn DecoderProvider>,
    encoder: Arc<dyn FrameEncoder>,
    capture_path: PathBuf,
}

impl FrameRenderer {
    pub(crate) fn new(
        io_pool: Arc<WorkerPool>,
        processing_pool: Arc<WorkerPool>,
        provider: Arc<dyn DecoderProvider>,
        encoder: Arc<dyn FrameEncoder>,
        capture_path: PathBuf,
    ) -> Self {
        Self {
            io_pool,
            processing_pool,
            provider,
            encoder,
            capture_path,
        }
    }

    /// The image encoder driven by this renderer.
    pub(crate) fn encoder(&self) -> &dyn FrameEncoder {
        &*self.encoder
    }

    /// Queue an asynchronous render of `len` bytes at `pos` of the image
    /// synthesized for `timestamp`. Returns immediately; the outcome is
    /// delivered only through `done`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        timestamp: Timestamp,
        options: RenderOptions,
        fps: f32,
        scale: u32,
        pos: u64,
        len: usize,
        done: ReadComplete,
    ) {
        let (decoded_tx, decoded_rx) = crossbeam_channel::bounded::<EngineResult<DecodedFrame>>(1);

        let provider = Arc::clone(&self.provider);
        let capture_path = self.capture_path.clone();
        self.io_pool.execute(move || {
            debug!(timestamp, %options, "Reading frame");
            let decoded = decode_frame(&provider, &capture_path, timestamp);
            // The encode stage only disappears when its pool shut down.
            let _ = decoded_tx.send(decoded);
        });

        let encoder = Arc::clone(&self.encoder);
        self.processing_pool.execute(move || {
            match encode_range(&decoded_rx, &*encoder, options, fps, scale, pos, len) {
                Ok(bytes) => {
                    let written = bytes.len();
                    done(bytes, READ_STATUS_OK);
                    debug!(timestamp, written, "Frame read complete");
                }
                Err(e) => {
                    error!(timestamp, error = %e, "Frame read failed");
                    done(Bytes::new(), READ_STATUS_FAILED);
                }
            }
        });
    }
}

/// Stage 1: decode `timestamp` with this worker's cached decoder.
fn decode_frame(
    provider: &Arc<dyn DecoderProvider>,
    capture_path: &Path,
    timestamp: Timestamp,
) -> EngineResult<DecodedFrame> {
    DECODERS.with(|cache| {
        let mut cache = cache.borrow_mut();

        if !cache.contains_key(capture_path) {
            debug!(path = %capture_path.display(), "Opening worker-local decoder");
            cache.insert(capture_path.to_path_buf(), provider.open(capture_path)?);
        }
        let decoder = cache
            .get_mut(capture_path)
            .ok_or_else(|| EngineError::Internal("decoder cache slot vanished".into()))?;

        let frames = decoder.frames()?;
        let frame_index = frames
            .iter()
            .position(|&t| t == timestamp)
            .ok_or(SourceError::FrameNotFound(timestamp))?;

        let (raw, frame_value) = decoder.load_frame(timestamp)?;
        let camera = CameraMetadata::parse(&decoder.container_metadata()?)?;
        let frame = FrameMetadata::parse(&frame_value)?;

        Ok(DecodedFrame {
            frame_index,
            camera,
            frame,
            raw,
        })
    })
}

/// Stage 2: wait for the decode, encode the image, and slice the range.
fn encode_range(
    decoded_rx: &Receiver<EngineResult<DecodedFrame>>,
    encoder: &dyn FrameEncoder,
    options: RenderOptions,
    fps: f32,
    scale: u32,
    pos: u64,
    len: usize,
) -> EngineResult<Bytes> {
    let decoded = decoded_rx
        .recv()
        .map_err(|_| EngineError::Internal("decode stage dropped its result".into()))??;

    let image = encoder.encode(
        &decoded.raw,
        &decoded.frame,
        &decoded.camera,
        fps,
        decoded.frame_index,
        options,
        scale,
    )?;

    // Reading past the end of the image is a successful empty read.
    if pos >= image.len() as u64 {
        return Ok(Bytes::new());
    }

    let start = pos as usize;
    let end = start.saturating_add(len).min(image.len());
    Ok(image.slice(start..end))
}
