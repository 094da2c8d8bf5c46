//! Camera metadata value types.
//!
//! Captures carry two JSON metadata blobs: one for the container (static
//! sensor description) and one per frame (exposure state). Both arrive as
//! untyped JSON from the decoder and are parsed into these value types
//! before they reach the image encoder.

use serde::{Deserialize, Serialize};

use crate::SourceResult;

/// Static sensor description shared by every frame of a capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraMetadata {
    /// Sensor width in pixels.
    #[serde(default)]
    pub width: u32,

    /// Sensor height in pixels.
    #[serde(default)]
    pub height: u32,

    /// Colour filter arrangement (0 = RGGB, 1 = GRBG, 2 = GBRG, 3 = BGGR).
    #[serde(default)]
    pub sensor_arrangement: u8,

    /// Per-channel black level.
    #[serde(default)]
    pub black_level: Vec<f32>,

    /// Sensor saturation level.
    #[serde(default)]
    pub white_level: f32,

    /// Reference-illuminant colour matrix, row major.
    #[serde(default)]
    pub color_matrix: Vec<f32>,

    /// Camera model string, when the capture recorded one.
    #[serde(default)]
    pub camera_model: Option<String>,
}

impl CameraMetadata {
    /// Parse the container metadata blob handed back by a decoder.
    pub fn parse(value: &serde_json::Value) -> SourceResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Per-frame exposure state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMetadata {
    /// Exposure time in nanoseconds.
    #[serde(default)]
    pub exposure_time: i64,

    /// ISO sensitivity.
    #[serde(default)]
    pub iso: u32,

    /// Frame orientation in degrees clockwise.
    #[serde(default)]
    pub orientation: u16,

    /// Per-channel white balance gains as shot.
    #[serde(default)]
    pub as_shot_neutral: Vec<f32>,

    /// Payload compression used for the raw bytes (0 = none).
    #[serde(default)]
    pub compression_type: u8,
}

impl FrameMetadata {
    /// Parse the per-frame metadata blob handed back by a decoder.
    pub fn parse(value: &serde_json::Value) -> SourceResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}
