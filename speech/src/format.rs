//! PCM audio format shared between synthesis and transcription.

use std::time::Duration;

/// Describes the layout of a raw PCM buffer: sample rate, bytes per sample,
/// and channel count. Mirrors the fields carried by `audio-start` /
/// `audio-chunk` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    pub rate: u32,
    pub width: u8,
    pub channels: u8,
}

/// Error returned when an `AudioFormat` violates the wire invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("sample rate must be positive")]
    ZeroRate,
    #[error("sample width must be 2 or 4 bytes, got {0}")]
    InvalidWidth(u8),
    #[error("channel count must be at least 1")]
    ZeroChannels,
}

impl AudioFormat {
    pub fn new(rate: u32, width: u8, channels: u8) -> Result<Self, FormatError> {
        if rate == 0 {
            return Err(FormatError::ZeroRate);
        }
        if width != 2 && width != 4 {
            return Err(FormatError::InvalidWidth(width));
        }
        if channels == 0 {
            return Err(FormatError::ZeroChannels);
        }
        Ok(Self { rate, width, channels })
    }

    /// Bytes of PCM data needed to cover `duration` at this format.
    pub fn bytes_in_duration(&self, duration: Duration) -> usize {
        let bytes_per_second = self.rate as u64 * self.channels as u64 * self.width as u64;
        (bytes_per_second * duration.as_micros() as u64 / 1_000_000) as usize
    }

    /// A buffer of digital silence covering `duration`.
    pub fn silence(&self, duration: Duration) -> Vec<u8> {
        vec![0u8; self.bytes_in_duration(duration)]
    }
}
