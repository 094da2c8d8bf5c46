//! Audio-to-video alignment.

use tracing::debug;

use rawvfs_source::{AudioChunk, Timestamp};

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Align the audio stream to the first video frame.
///
/// When the audio starts after the video, leading sample frames are
/// trimmed; when it starts before, a silence chunk is prepended and every
/// subsequent chunk shifts forward by the same amount. All timestamp
/// arithmetic happens in nanoseconds. On return the first chunk's
/// timestamp equals `video_t0` exactly.
pub fn sync_audio(
    video_t0: Timestamp,
    chunks: &mut Vec<AudioChunk>,
    sample_rate: u32,
    channels: u16,
) {
    if chunks.is_empty() || sample_rate == 0 || channels == 0 {
        return;
    }

    let drift_ns = chunks[0].timestamp - video_t0;
    debug!(
        drift_ms = drift_ns as f64 * 1e-6,
        sample_rate, channels, "Aligning audio to video"
    );

    if drift_ns > 0 {
        // Audio starts late: drop whole frames off the front.
        let frames_to_remove =
            (drift_ns as f64 * sample_rate as f64 / NANOS_PER_SECOND).round() as usize;
        let mut samples_to_remove = frames_to_remove * channels as usize;

        while samples_to_remove > 0 {
            let Some(first) = chunks.first_mut() else {
                break;
            };

            if first.samples.len() <= samples_to_remove {
                samples_to_remove -= first.samples.len();
                chunks.remove(0);
            } else {
                first.samples.drain(..samples_to_remove);
                let trimmed_frames = (samples_to_remove / channels as usize) as i64;
                first.timestamp +=
                    trimmed_frames * 1_000_000_000 / sample_rate as i64;
                samples_to_remove = 0;
            }
        }
    } else {
        // Audio starts early: lead in with silence and push everything back.
        let lead_ns = -drift_ns;
        let silence_frames =
            (lead_ns as f64 * sample_rate as f64 / NANOS_PER_SECOND).round() as usize;

        for chunk in chunks.iter_mut() {
            chunk.timestamp += lead_ns;
        }
        chunks.insert(0, AudioChunk::silence(video_t0, silence_frames, channels));
    }

    // Rounding the drift to whole sample frames can leave the head a few
    // nanoseconds off; the head chunk is defined to sit on the video origin.
    if let Some(first) = chunks.first_mut() {
        first.timestamp = video_t0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48_000;
    const CHANNELS: u16 = 2;

    fn chunks_starting_at(timestamp: Timestamp, count: usize, frames_each: usize) -> Vec<AudioChunk> {
        let chunk_ns = frames_each as i64 * 1_000_000_000 / SAMPLE_RATE as i64;
        (0..count)
            .map(|i| {
                AudioChunk::new(
                    timestamp + i as i64 * chunk_ns,
                    vec![1; frames_each * CHANNELS as usize],
                )
            })
            .collect()
    }

    #[test]
    fn test_audio_late_trims_leading_frames() {
        // Audio begins 100 ms after the video: 4800 frames = 9600 samples go.
        let video_t0 = 1_000_000_000;
        let mut chunks = chunks_starting_at(video_t0 + 100_000_000, 12, 1000);
        let total_before: usize = chunks.iter().map(|c| c.samples.len()).sum();

        sync_audio(video_t0, &mut chunks, SAMPLE_RATE, CHANNELS);

        let total_after: usize = chunks.iter().map(|c| c.samples.len()).sum();
        assert_eq!(total_before - total_after, 9600);
        assert_eq!(chunks[0].timestamp, video_t0);
        // 4 whole chunks erased, 800 frames trimmed from the fifth.
        assert_eq!(chunks.len(), 8);
        assert_eq!(chunks[0].samples.len(), 400);
    }

    #[test]
    fn test_audio_early_prepends_silence() {
        // Audio begins 50 ms before the video: 2400 frames of silence lead in.
        let video_t0 = 2_000_000_000;
        let audio_t0 = video_t0 - 50_000_000;
        let mut chunks = chunks_starting_at(audio_t0, 3, 1000);

        sync_audio(video_t0, &mut chunks, SAMPLE_RATE, CHANNELS);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].timestamp, video_t0);
        assert_eq!(chunks[0].samples.len(), 4800);
        assert!(chunks[0].samples.iter().all(|&s| s == 0));
        // Original chunks shifted by the lead-in amount.
        assert_eq!(chunks[1].timestamp, audio_t0 + 50_000_000);
    }

    #[test]
    fn test_already_aligned_is_untouched() {
        let video_t0 = 500;
        let mut chunks = chunks_starting_at(video_t0, 2, 100);
        let before = chunks.clone();

        sync_audio(video_t0, &mut chunks, SAMPLE_RATE, CHANNELS);

        // Zero drift inserts an empty silence chunk and shifts nothing.
        assert_eq!(chunks[0].timestamp, video_t0);
        assert!(chunks[0].samples.is_empty());
        assert_eq!(&chunks[1..], &before[..]);
    }

    #[test]
    fn test_postcondition_first_timestamp_matches_video() {
        for drift in [-75_000_000i64, -1, 0, 1, 33_333_333, 250_000_000] {
            let video_t0 = 10_000_000_000;
            let mut chunks = chunks_starting_at(video_t0 + drift, 5, 512);
            sync_audio(video_t0, &mut chunks, SAMPLE_RATE, CHANNELS);
            assert_eq!(chunks[0].timestamp, video_t0, "drift {drift}");
        }
    }

    #[test]
    fn test_trim_longer_than_audio_leaves_nothing() {
        let video_t0 = 0;
        let mut chunks = chunks_starting_at(10_000_000_000, 2, 100);
        sync_audio(video_t0, &mut chunks, SAMPLE_RATE, CHANNELS);
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_empty_input_is_a_no_op() {
        let mut chunks = Vec::new();
        sync_audio(0, &mut chunks, SAMPLE_RATE, CHANNELS);
        assert!(chunks.is_empty());
    }
}
