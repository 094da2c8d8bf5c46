//! The virtual file system.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument};

use rawvfs_audio::{frame_rate_fraction, sync_audio, WavEncoder};
use rawvfs_render::{FrameEncoder, RenderOptions};
use rawvfs_source::{AudioChunk, CameraMetadata, DecoderProvider, FrameMetadata, Timestamp};

use crate::directory::{self, Entry};
use crate::pool::WorkerPool;
use crate::renderer::{FrameRenderer, ReadComplete, READ_STATUS_FAILED};
use crate::{EngineResult, AUDIO_FILE_NAME, IMAGE_EXTENSION, IO_THREADS};

/// Shell metadata file some hosts expect in every folder.
#[cfg(windows)]
const DESKTOP_INI_NAME: &str = "desktop.ini";

#[cfg(windows)]
const DESKTOP_INI: &str = "[.ShellClassInfo]
ConfirmFileOp=0

[ViewState]
Mode=4
Vid={137E7700-3573-11CF-AE69-08002B2E1262}
FolderType=Generic

[{5984FFE0-28D4-11CF-AE66-08002B2E1262}]
Mode=4
LogicalViewMode=1
IconSize=16

[LocalizedFileNames]
";

/// A read-only virtual directory synthesized from one capture file.
///
/// Opening a capture builds the directory model and the audio buffer
/// up front; image bytes are produced on demand by the renderer. Reads
/// take `&self` and re-initialisation takes `&mut self`, so a host that
/// wants concurrent reads wraps the file system in a reader-writer lock
/// and takes the write side for `update_options`.
pub struct VirtualFileSystem {
    capture_path: PathBuf,
    options: RenderOptions,
    draft_scale: u32,
    fps: f32,
    typical_image_size: u64,
    files: Vec<Entry>,
    audio: Bytes,
    provider: Arc<dyn DecoderProvider>,
    renderer: FrameRenderer,
}

impl VirtualFileSystem {
    /// Open a capture and synthesize its directory.
    pub fn open(
        provider: Arc<dyn DecoderProvider>,
        encoder: Arc<dyn FrameEncoder>,
        capture_path: impl Into<PathBuf>,
        options: RenderOptions,
        draft_scale: u32,
    ) -> EngineResult<Self> {
        let capture_path = capture_path.into();

        let io_pool = Arc::new(WorkerPool::new("rawvfs-io", IO_THREADS));
        let processing_pool = Arc::new(WorkerPool::new("rawvfs-proc", num_cpus::get()));
        let renderer = FrameRenderer::new(
            io_pool,
            processing_pool,
            Arc::clone(&provider),
            encoder,
            capture_path.clone(),
        );

        let mut vfs = Self {
            capture_path,
            options,
            draft_scale,
            fps: 0.0,
            typical_image_size: 0,
            files: Vec::new(),
            audio: Bytes::new(),
            provider,
            renderer,
        };
        vfs.init(options)?;
        Ok(vfs)
    }

    /// Build the directory model: probe-encode the first frame for the
    /// uniform image size, materialise the audio buffer, then enumerate
    /// the presentation slots.
    #[instrument(name = "vfs_init", skip(self))]
    fn init(&mut self, options: RenderOptions) -> EngineResult<()> {
        self.options = options;
        self.files.clear();
        self.audio = Bytes::new();
        self.fps = 0.0;
        self.typical_image_size = 0;

        let mut decoder = self.provider.open(&self.capture_path)?;
        let mut frames = decoder.frames()?;
        frames.sort_unstable();

        if frames.is_empty() {
            debug!("Capture has no frames");
            return Ok(());
        }

        self.fps = directory::nominal_frame_rate(&frames);

        // Probe encode: the first frame's encoded length is reported as
        // the size of every image entry.
        let (raw, frame_value) = decoder.load_frame(frames[0])?;
        let camera = CameraMetadata::parse(&decoder.container_metadata()?)?;
        let frame_meta = FrameMetadata::parse(&frame_value)?;
        let probe = self.probe_encode(&raw, &frame_meta, &camera, options)?;
        self.typical_image_size = probe.len() as u64;

        #[cfg(windows)]
        self.files
            .push(Entry::file(DESKTOP_INI_NAME, DESKTOP_INI.len() as u64));

        let audio_chunks = decoder.load_audio()?;
        if !audio_chunks.is_empty() {
            self.audio = build_audio(
                audio_chunks,
                frames[0],
                decoder.audio_sample_rate_hz(),
                decoder.num_audio_channels(),
                self.fps,
            )?;
            self.files
                .push(Entry::file(AUDIO_FILE_NAME, self.audio.len() as u64));
        }

        self.files.extend(directory::frame_entries(
            &frames,
            self.fps,
            self.typical_image_size,
        ));

        info!(
            entries = self.files.len(),
            fps = self.fps,
            image_size = self.typical_image_size,
            audio_bytes = self.audio.len(),
            "Virtual directory initialised"
        );
        Ok(())
    }

    /// Encode the first frame once to learn the byte size every image
    /// entry will report.
    fn probe_encode(
        &self,
        raw: &[u8],
        frame_meta: &FrameMetadata,
        camera: &CameraMetadata,
        options: RenderOptions,
    ) -> EngineResult<Bytes> {
        let scale = options.effective_scale(self.draft_scale);
        Ok(self
            .renderer
            .encoder()
            .encode(raw, frame_meta, camera, self.fps, 0, options, scale)?)
    }

    /// All entries, in stable synthesis order. The filter is advisory and
    /// currently unused.
    pub fn list(&self, _filter: &str) -> &[Entry] {
        &self.files
    }

    /// Look up an entry by the final component of `path`.
    pub fn find(&self, path: &str) -> Option<&Entry> {
        let name = Path::new(path).file_name()?.to_str()?;
        self.files.iter().find(|entry| entry.name == name)
    }

    /// Read up to `len` bytes at `pos` of an entry.
    ///
    /// Audio and hidden entries are served inline: the returned slice is
    /// the read result and `done` is never invoked. Image entries return
    /// an empty slice immediately and complete through `done` on a worker
    /// thread. Unreadable entries fail through `done` with a non-zero
    /// status.
    pub fn read(
        &self,
        entry: &Entry,
        options: RenderOptions,
        pos: u64,
        len: usize,
        done: ReadComplete,
    ) -> Bytes {
        #[cfg(windows)]
        if entry.name == DESKTOP_INI_NAME {
            return slice_range(&Bytes::from_static(DESKTOP_INI.as_bytes()), pos, len);
        }

        if entry.name.ends_with(".wav") {
            return slice_range(&self.audio, pos, len);
        }

        if let Some(timestamp) = entry
            .name
            .ends_with(IMAGE_EXTENSION)
            .then_some(entry.frame)
            .flatten()
        {
            let scale = options.effective_scale(self.draft_scale);
            self.renderer
                .render(timestamp, options, self.fps, scale, pos, len, done);
            return Bytes::new();
        }

        done(Bytes::new(), READ_STATUS_FAILED);
        Bytes::new()
    }

    /// Re-run initialisation with new options. Cached listings and sizes
    /// become stale; callers must re-list after this returns.
    #[instrument(name = "vfs_update_options", skip(self))]
    pub fn update_options(
        &mut self,
        options: RenderOptions,
        draft_scale: u32,
    ) -> EngineResult<()> {
        self.draft_scale = draft_scale;
        self.init(options)
    }

    /// Nominal frame rate of the capture, 0 when unknown.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Currently applied render options.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Byte size reported by every image entry.
    pub fn typical_image_size(&self) -> u64 {
        self.typical_image_size
    }

    /// Path of the capture backing this file system.
    pub fn capture_path(&self) -> &Path {
        &self.capture_path
    }
}

/// Align the capture's audio to the first video frame and materialise it
/// as a WAV buffer.
fn build_audio(
    mut chunks: Vec<AudioChunk>,
    video_t0: Timestamp,
    sample_rate: u32,
    channels: u16,
    fps: f32,
) -> EngineResult<Bytes> {
    sync_audio(video_t0, &mut chunks, sample_rate, channels);

    let (fps_num, fps_den) = frame_rate_fraction(fps);
    let mut encoder = WavEncoder::new(
        Cursor::new(Vec::new()),
        channels,
        sample_rate,
        fps_num,
        fps_den,
    )?;

    for chunk in &chunks {
        let frames = chunk.frame_count(channels) as u64;
        encoder.write(&chunk.samples, frames)?;
    }

    let sink = encoder.finish()?;
    Ok(Bytes::from(sink.into_inner()))
}

/// Zero-copy slice of an in-memory buffer; empty past the end.
fn slice_range(buffer: &Bytes, pos: u64, len: usize) -> Bytes {
    if pos >= buffer.len() as u64 {
        return Bytes::new();
    }
    let start = pos as usize;
    let end = start.saturating_add(len).min(buffer.len());
    buffer.slice(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_range_clamps_to_buffer() {
        let buffer = Bytes::from_static(b"0123456789");
        assert_eq!(slice_range(&buffer, 0, 4), Bytes::from_static(b"0123"));
        assert_eq!(slice_range(&buffer, 8, 100), Bytes::from_static(b"89"));
        assert_eq!(slice_range(&buffer, 10, 1), Bytes::new());
        assert_eq!(slice_range(&buffer, 100, 1), Bytes::new());
    }
}
