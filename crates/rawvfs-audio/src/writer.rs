//! WAV stream encoder.

use std::io::{Seek, Write};

use tracing::debug;

use rawvfs_container::{encode_pcm_i16, FormatInfo, RiffFormat, RiffWriter};

use crate::{AudioError, AudioResult, BITS_PER_SAMPLE};

/// Express a frame rate as a rational hint for downstream tooling.
///
/// NTSC-family rates map onto their exact 1001-denominator fractions;
/// everything else is carried at millihertz precision.
pub fn frame_rate_fraction(fps: f32) -> (u32, u32) {
    let milli = (fps as f64 * 1000.0).round() as u32;
    match milli {
        23_976 => (24_000, 1001),
        29_970 => (30_000, 1001),
        59_940 => (60_000, 1001),
        119_880 => (120_000, 1001),
        _ if milli % 1000 == 0 => (milli / 1000, 1),
        _ => (milli, 1000),
    }
}

/// Encodes interleaved 16-bit PCM into a RIFF-family WAV stream.
///
/// The writer promotes to BW64 automatically if the sample payload
/// outgrows 32-bit chunk sizes.
pub struct WavEncoder<W: Write + Seek> {
    writer: RiffWriter<W>,
    channels: u16,
    sample_rate: u32,
    frames_written: u64,
}

impl<W: Write + Seek> WavEncoder<W> {
    /// Open a WAV stream on `sink`. The frame-rate fraction is a metadata
    /// hint for the capture's video cadence and does not affect the
    /// emitted chunks.
    pub fn new(
        sink: W,
        channels: u16,
        sample_rate: u32,
        fps_num: u32,
        fps_den: u32,
    ) -> AudioResult<Self> {
        debug!(
            channels,
            sample_rate, fps_num, fps_den, "Opening WAV stream"
        );

        let mut writer = RiffWriter::new(sink, RiffFormat::Bw64)?;
        writer.write_fmt(&FormatInfo::pcm(channels, sample_rate, BITS_PER_SAMPLE))?;
        writer.begin_data()?;

        Ok(Self {
            writer,
            channels,
            sample_rate,
            frames_written: 0,
        })
    }

    /// Append `frame_count` interleaved sample frames.
    pub fn write(&mut self, samples: &[i16], frame_count: u64) -> AudioResult<()> {
        if samples.len() as u64 != frame_count * self.channels as u64 {
            return Err(AudioError::SampleCountMismatch {
                samples: samples.len(),
                frames: frame_count,
                channels: self.channels,
            });
        }

        self.writer.write_data(&encode_pcm_i16(samples))?;
        self.frames_written += frame_count;
        Ok(())
    }

    /// Total sample frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Audio duration written so far, in nanoseconds.
    pub fn duration_ns(&self) -> i64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.frames_written as i64) * 1_000_000_000 / self.sample_rate as i64
    }

    /// Seal the container and hand back the sink.
    pub fn finish(mut self) -> AudioResult<W> {
        self.writer.finish()?;
        debug!(frames = self.frames_written, "WAV stream finished");
        Ok(self.writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_data_chunk_carries_raw_little_endian_samples() {
        let mut encoder = WavEncoder::new(Cursor::new(Vec::new()), 2, 48000, 30, 1).unwrap();
        encoder.write(&[1, -1, 257, 0], 2).unwrap();
        let bytes = encoder.finish().unwrap().into_inner();

        // data payload sits at the tail: 4 samples * 2 bytes.
        let payload = &bytes[bytes.len() - 8..];
        assert_eq!(payload, &[1, 0, 0xFF, 0xFF, 1, 1, 0, 0]);
    }

    #[test]
    fn test_data_size_is_frames_times_block_alignment() {
        let mut encoder = WavEncoder::new(Cursor::new(Vec::new()), 2, 48000, 24, 1).unwrap();
        encoder.write(&vec![0i16; 2 * 750], 750).unwrap();
        encoder.write(&vec![0i16; 2 * 250], 250).unwrap();
        assert_eq!(encoder.frames_written(), 1000);
        let bytes = encoder.finish().unwrap().into_inner();

        // Find the data header behind the fixed prelude:
        // RIFF(12) + JUNK placeholder + fmt(24).
        let junk_len = 8 + u32::from_le_bytes(bytes[16..20].try_into().unwrap()) as usize;
        let data_pos = 12 + junk_len + 24;
        assert_eq!(&bytes[data_pos..data_pos + 4], b"data");
        let data_size = u32::from_le_bytes(bytes[data_pos + 4..data_pos + 8].try_into().unwrap());
        assert_eq!(data_size as u64, 1000 * 4); // block alignment 4
    }

    #[test]
    fn test_mismatched_frame_count_is_rejected() {
        let mut encoder = WavEncoder::new(Cursor::new(Vec::new()), 2, 48000, 30, 1).unwrap();
        let result = encoder.write(&[0i16; 5], 2);
        assert!(matches!(
            result,
            Err(AudioError::SampleCountMismatch { samples: 5, frames: 2, channels: 2 })
        ));
    }

    #[test]
    fn test_frame_rate_fraction_ntsc_and_integer() {
        assert_eq!(frame_rate_fraction(29.97), (30_000, 1001));
        assert_eq!(frame_rate_fraction(23.976), (24_000, 1001));
        assert_eq!(frame_rate_fraction(30.0), (30, 1));
        assert_eq!(frame_rate_fraction(12.5), (12_500, 1000));
        assert_eq!(frame_rate_fraction(0.0), (0, 1));
    }

    #[test]
    fn test_duration_tracks_sample_rate() {
        let mut encoder = WavEncoder::new(Cursor::new(Vec::new()), 1, 48000, 30, 1).unwrap();
        encoder.write(&vec![0i16; 24_000], 24_000).unwrap();
        assert_eq!(encoder.duration_ns(), 500_000_000);
    }
}
