//! Directory synthesis.
//!
//! The virtual directory is derived from the capture's frame timestamps:
//! the nominal frame rate maps each source frame onto a presentation slot,
//! and a cursor walks the slot grid emitting one image entry per slot.
//! Slots with no source frame of their own (dropped frames) are filled by
//! duplicating the next frame that did arrive. The enumeration never
//! emits the final frame's own slot unless a later frame moves the cursor
//! past it; entry indices must stay identical across processes, so this
//! behaviour is part of the directory contract.

use rawvfs_source::Timestamp;

use crate::IMAGE_EXTENSION;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of the synthesized directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry kind; everything synthesized here is a file.
    pub kind: EntryKind,

    /// Unique name within the directory.
    pub name: String,

    /// Reported byte size. Image entries all report the probed typical
    /// size; the audio entry reports the materialised buffer length.
    pub size: u64,

    /// Source frame backing an image entry.
    pub frame: Option<Timestamp>,
}

impl Entry {
    /// A plain file entry with no backing frame.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            kind: EntryKind::File,
            name: name.into(),
            size,
            frame: None,
        }
    }
}

/// Nominal frame rate from successive timestamp deltas.
///
/// A running mean over the strictly positive deltas keeps the sum from
/// overflowing on long captures. Returns 0 when fewer than two frames or
/// no positive delta exist.
pub(crate) fn nominal_frame_rate(frames: &[Timestamp]) -> f32 {
    if frames.len() < 2 {
        return 0.0;
    }

    let mut average = 0.0f64;
    let mut count = 0u64;

    for pair in frames.windows(2) {
        let delta = (pair[1] - pair[0]) as f64;
        if delta > 0.0 {
            count += 1;
            average += (delta - average) / count as f64;
        }
    }

    if count == 0 {
        return 0.0;
    }
    (NANOS_PER_SECOND / average) as f32
}

/// Presentation slot of `timestamp` on the uniform grid anchored at
/// `reference`. Negative means the timestamp cannot be placed.
pub(crate) fn presentation_index(
    timestamp: Timestamp,
    reference: Timestamp,
    frame_rate: f32,
) -> i64 {
    if frame_rate <= 0.0 {
        return -1;
    }

    let delta = timestamp - reference;
    if delta < 0 {
        return -1;
    }

    let nanos_per_frame = NANOS_PER_SECOND / frame_rate as f64;
    (delta as f64 / nanos_per_frame).round() as i64
}

/// Zero-padded image entry name for a presentation slot.
pub(crate) fn frame_file_name(index: i64) -> String {
    format!("frame-{index:06}.{IMAGE_EXTENSION}")
}

/// Emit image entries for every presentation slot up to (and excluding)
/// each source frame's own slot, pointing gap-filled slots at the frame
/// that closed the gap.
pub(crate) fn frame_entries(
    frames: &[Timestamp],
    frame_rate: f32,
    image_size: u64,
) -> Vec<Entry> {
    let Some(&reference) = frames.first() else {
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(frames.len());
    let mut next_index = 0i64;

    for &timestamp in frames {
        let index = presentation_index(timestamp, reference, frame_rate);
        while next_index < index {
            entries.push(Entry {
                kind: EntryKind::File,
                name: frame_file_name(next_index),
                size: image_size,
                frame: Some(timestamp),
            });
            next_index += 1;
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const THIRTY_FPS_DELTA: Timestamp = 33_333_333;

    #[test]
    fn test_frame_rate_of_uniform_capture() {
        let frames = [0, THIRTY_FPS_DELTA, 2 * THIRTY_FPS_DELTA];
        let fps = nominal_frame_rate(&frames);
        assert!((fps - 30.0).abs() < 0.01, "fps was {fps}");
    }

    #[test]
    fn test_frame_rate_needs_two_frames() {
        assert_eq!(nominal_frame_rate(&[]), 0.0);
        assert_eq!(nominal_frame_rate(&[1_000_000_000]), 0.0);
    }

    #[test]
    fn test_frame_rate_ignores_non_positive_deltas() {
        // Duplicate timestamps contribute nothing.
        assert_eq!(nominal_frame_rate(&[5, 5, 5]), 0.0);

        let fps = nominal_frame_rate(&[0, 0, THIRTY_FPS_DELTA]);
        assert!((fps - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_frame_rate_positive_for_monotonic_input() {
        let frames: Vec<Timestamp> = (0..100).map(|i| i * 16_666_667).collect();
        assert!(nominal_frame_rate(&frames) > 0.0);
    }

    #[test]
    fn test_presentation_index_rounds_to_nearest_slot() {
        assert_eq!(presentation_index(0, 0, 30.0), 0);
        assert_eq!(presentation_index(THIRTY_FPS_DELTA, 0, 30.0), 1);
        // A frame arriving slightly early still lands on its slot.
        assert_eq!(presentation_index(THIRTY_FPS_DELTA - 2_000_000, 0, 30.0), 1);
    }

    #[test]
    fn test_presentation_index_invalid_inputs() {
        assert_eq!(presentation_index(100, 0, 0.0), -1);
        assert_eq!(presentation_index(100, 0, -30.0), -1);
        assert_eq!(presentation_index(0, 100, 30.0), -1);
    }

    #[test]
    fn test_frame_file_name_is_zero_padded() {
        assert_eq!(frame_file_name(0), "frame-000000.dng");
        assert_eq!(frame_file_name(42), "frame-000042.dng");
        assert_eq!(frame_file_name(1_234_567), "frame-1234567.dng");
    }

    #[test]
    fn test_uniform_capture_emits_all_but_the_last_slot() {
        let frames = [0, THIRTY_FPS_DELTA, 2 * THIRTY_FPS_DELTA];
        let entries = frame_entries(&frames, 30.0, 4096);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "frame-000000.dng");
        assert_eq!(entries[0].frame, Some(THIRTY_FPS_DELTA));
        assert_eq!(entries[1].name, "frame-000001.dng");
        assert_eq!(entries[1].frame, Some(2 * THIRTY_FPS_DELTA));
        assert!(entries.iter().all(|e| e.size == 4096));
    }

    #[test]
    fn test_dropped_frames_duplicate_the_closing_frame() {
        // Second frame lands three slots out: the two missing slots and
        // its predecessor slot all point at it.
        let frames = [0, 100_000_000];
        let entries = frame_entries(&frames, 30.0, 1024);

        assert_eq!(entries.len(), 3);
        for (slot, entry) in entries.iter().enumerate() {
            assert_eq!(entry.name, frame_file_name(slot as i64));
            assert_eq!(entry.frame, Some(100_000_000));
        }
    }

    #[test]
    fn test_single_frame_emits_nothing() {
        let entries = frame_entries(&[1_000_000_000], 0.0, 4096);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_names_are_unique_and_ordered() {
        let frames: Vec<Timestamp> = (0..50).map(|i| i * THIRTY_FPS_DELTA).collect();
        let entries = frame_entries(&frames, 30.0, 100);

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), entries.len());
        assert_eq!(names, sorted);
    }
}
