//! PCM sample packing.
//!
//! Float samples are carried in [-1, 1] for 24- and 32-bit depths. For the
//! 16-bit depth the float buffer holds integer-scale values (±32767), so
//! packing is a plain narrowing of the stored value; this matches the
//! integer-passthrough behaviour of 16-bit decode below.

use crate::{ContainerError, ContainerResult};

const SCALE_24: f32 = 8_388_607.0;
const SCALE_32: f32 = 2_147_483_647.0;

fn clip(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

/// Pack interleaved 16-bit samples as little-endian bytes.
pub fn encode_pcm_i16(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Pack float samples at the given bit depth.
pub fn encode_pcm_f32(samples: &[f32], bits_per_sample: u16) -> ContainerResult<Vec<u8>> {
    let bytes_per_sample = bits_per_sample as usize / 8;
    let mut bytes = Vec::with_capacity(samples.len() * bytes_per_sample);

    match bits_per_sample {
        16 => {
            for &sample in samples {
                bytes.extend_from_slice(&(sample as i16).to_le_bytes());
            }
        }
        24 => {
            for &sample in samples {
                let value = (clip(sample) * SCALE_24).floor() as i32;
                bytes.extend_from_slice(&value.to_le_bytes()[..3]);
            }
        }
        32 => {
            for &sample in samples {
                let value = (clip(sample) * SCALE_32).floor() as i32;
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        other => {
            return Err(ContainerError::UnsupportedFormat(format!(
                "unsupported bits per sample: {other}"
            )))
        }
    }

    Ok(bytes)
}

/// Unpack little-endian PCM bytes into float samples.
///
/// 16-bit samples come back at integer scale; 24- and 32-bit samples are
/// normalised by the 32-bit full-scale divisor.
pub fn decode_pcm_f32(bytes: &[u8], bits_per_sample: u16) -> ContainerResult<Vec<f32>> {
    let bytes_per_sample = match bits_per_sample {
        16 => 2,
        24 => 3,
        32 => 4,
        other => {
            return Err(ContainerError::UnsupportedFormat(format!(
                "unsupported bits per sample: {other}"
            )))
        }
    };

    let mut samples = Vec::with_capacity(bytes.len() / bytes_per_sample);
    for raw in bytes.chunks_exact(bytes_per_sample) {
        let sample = match bits_per_sample {
            16 => i16::from_le_bytes([raw[0], raw[1]]) as f32,
            24 => {
                // Sign-extend by packing into the top three bytes.
                let value = i32::from_le_bytes([0, raw[0], raw[1], raw[2]]);
                value as f32 / SCALE_32
            }
            _ => {
                let value = i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                value as f32 / SCALE_32
            }
        };
        samples.push(sample);
    }

    Ok(samples)
}
