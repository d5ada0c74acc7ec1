//! Property extractor — turns the `fmt ` and `fact` chunks into [`Properties`].
//!
//! Only header chunks are inspected; sample data is never decoded. The
//! caller may override the stream length and the total sample-frame count
//! through [`ReadHints`] when it knows better than the container.
//!
//! # Resolution order
//!
//! | Value          | 1st              | 2nd                 | 3rd                               |
//! |----------------|------------------|---------------------|-----------------------------------|
//! | stream length  | hint (non-zero)  | buffer length − 44  |                                   |
//! | sample frames  | hint (non-zero)  | `fact` (non-zero)   | stream length / frame bytes, or 0 |
//! | length (ms)    | frames × 1000 / sample rate | stream length × 1000 / byte rate | 0 |
//! | bitrate (kb/s) | stream length × 8 / length (ms) | 0    |                                   |
//!
//! All divisions truncate.

use core::time::Duration;

use crate::audio::AudioProperties;
use crate::chunk::{read_u32_le, Chunks, RiffHeader};
use crate::error::PropertiesError;
use crate::format::{FormatChunk, FormatExtension, FormatTag};
use crate::logging::{debug, trace};

/// Chunk id of the format chunk.
pub const FMT_ID: [u8; 4] = *b"fmt ";

/// Chunk id of the fact chunk.
pub const FACT_ID: [u8; 4] = *b"fact";

/// Size of a canonical PCM header (`RIFF` + `fmt ` + `data` headers).
///
/// Subtracted from the buffer length when no stream length is supplied.
pub const CANONICAL_HEADER_LEN: usize = 44;

// ---------------------------------------------------------------------------
// ReadHints
// ---------------------------------------------------------------------------

/// Externally known values that take precedence over the container's own.
///
/// A hint of `Some(0)` is treated the same as `None`.
///
/// ```
/// use wav_properties::ReadHints;
///
/// let hints = ReadHints::AUTO
///     .with_stream_length(1_764_000)
///     .with_total_sample_frames(441_000);
/// assert_eq!(hints.stream_length, Some(1_764_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadHints {
    /// Length in bytes of the audio stream, e.g. the size of the `data`
    /// chunk as measured by the file layer.
    pub stream_length: Option<u32>,
    /// Total sample frames, e.g. from a `fact` chunk found elsewhere.
    pub total_sample_frames: Option<u32>,
}

impl ReadHints {
    /// No hints: everything is derived from the buffer.
    pub const AUTO: Self = Self {
        stream_length: None,
        total_sample_frames: None,
    };

    /// Override the stream length.
    #[must_use]
    pub const fn with_stream_length(mut self, bytes: u32) -> Self {
        self.stream_length = Some(bytes);
        self
    }

    /// Override the total sample-frame count.
    #[must_use]
    pub const fn with_total_sample_frames(mut self, frames: u32) -> Self {
        self.total_sample_frames = Some(frames);
        self
    }

    fn stream_length(&self) -> Option<u32> {
        self.stream_length.filter(|&n| n != 0)
    }

    fn total_sample_frames(&self) -> Option<u32> {
        self.total_sample_frames.filter(|&n| n != 0)
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Audio properties of a WAVE stream.
///
/// Built once by [`Properties::read`]; holds no reference to the input
/// buffer. `channels()` and `sample_rate()` are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "PropertiesRecord")
)]
pub struct Properties {
    format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    bits_per_sample: u16,
    extension: Option<FormatExtension>,
    sample_frames: u32,
    stream_length: u32,
    length_ms: u32,
    bitrate: u32,
}

impl Properties {
    /// Read properties from a buffer holding at least the RIFF header and
    /// every chunk up to and including `fmt ` (and `fact`, if present).
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError::NotRiffWave`] when the buffer does not open
    /// with a `RIFF`/`WAVE` header, [`PropertiesError::MissingFormatChunk`]
    /// when no `fmt ` chunk is found, and the [`FormatChunk::decode`] errors
    /// when the first `fmt ` chunk is malformed.
    pub fn read(data: &[u8], hints: ReadHints) -> Result<Self, PropertiesError> {
        let header = RiffHeader::parse(data)
            .filter(RiffHeader::is_wave)
            .ok_or(PropertiesError::NotRiffWave)?;
        trace!(
            "RIFF size {}, buffer {} bytes",
            header.riff_size,
            data.len()
        );

        let mut format = None;
        let mut fact = None;
        for chunk in Chunks::new(data) {
            match chunk.id() {
                FMT_ID if format.is_none() => {
                    format = Some(FormatChunk::decode(chunk.data())?);
                }
                FACT_ID if fact.is_none() => {
                    // A fact chunk too short for its u32 still counts as seen.
                    fact = Some(read_u32_le(chunk.data(), 0).unwrap_or(0));
                }
                _ => {}
            }
            if format.is_some() && fact.is_some() {
                break;
            }
        }

        let format = format.ok_or_else(|| {
            debug!("no 'fmt ' chunk in {} bytes", data.len());
            PropertiesError::MissingFormatChunk
        })?;

        if fact.is_none() && hints.total_sample_frames().is_none() && !format.tag().is_linear() {
            debug!(
                "format {} has no 'fact' chunk, frame count is estimated",
                format.format_tag
            );
        }

        let stream_length = resolve_stream_length(data.len(), &hints);
        let sample_frames = resolve_sample_frames(&format, fact, stream_length, &hints);
        let length_ms = length_in_milliseconds(&format, sample_frames, stream_length);
        let bitrate = bitrate_kbps(stream_length, length_ms);

        Ok(Self {
            format: format.format_tag,
            channels: format.channels,
            sample_rate: format.sample_rate,
            byte_rate: format.byte_rate,
            bits_per_sample: format.bits_per_sample,
            extension: format.extension,
            sample_frames,
            stream_length,
            length_ms,
            bitrate,
        })
    }

    /// Read properties with every value derived from the buffer.
    ///
    /// # Errors
    ///
    /// See [`Properties::read`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, PropertiesError> {
        Self::read(data, ReadHints::AUTO)
    }

    /// Number of audio channels (≥ 1).
    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz (≥ 1).
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bits per sample; 0 for the 14-byte legacy `fmt ` layout.
    #[must_use]
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Total sample frames; 0 when neither hint, `fact` nor derivation
    /// produced a value.
    #[must_use]
    pub fn sample_frames(&self) -> u32 {
        self.sample_frames
    }

    /// Raw format tag: 0 unknown, 1 PCM, 2 ADPCM, 3 IEEE float, ...
    #[must_use]
    pub fn format(&self) -> u16 {
        self.format
    }

    /// The format tag as a registry value.
    #[must_use]
    pub fn format_tag(&self) -> FormatTag {
        FormatTag::from(self.format)
    }

    /// Average bytes per second from the `fmt ` chunk.
    #[must_use]
    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    /// Stream length in bytes used for the derived values.
    #[must_use]
    pub fn stream_length(&self) -> u32 {
        self.stream_length
    }

    /// Length in whole seconds, rounded down.
    #[must_use]
    pub fn length_in_seconds(&self) -> u32 {
        self.length_ms / 1000
    }

    /// Length in milliseconds.
    #[must_use]
    pub fn length_in_milliseconds(&self) -> u32 {
        self.length_ms
    }

    /// Length as a [`Duration`], millisecond precision.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.length_ms))
    }

    /// Average bitrate in kb/s; 0 when the length is 0.
    #[must_use]
    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// Valid bits per sample (extensible layout only).
    #[must_use]
    pub fn valid_bits_per_sample(&self) -> Option<u16> {
        self.extension.map(|ext| ext.valid_bits_per_sample)
    }

    /// Speaker position mask (extensible layout only).
    #[must_use]
    pub fn channel_mask(&self) -> Option<u32> {
        self.extension.map(|ext| ext.channel_mask)
    }

    /// Format code of the sub-format GUID (extensible layout only).
    #[must_use]
    pub fn sub_format(&self) -> Option<FormatTag> {
        self.extension.map(|ext| FormatTag::from(ext.sub_format))
    }
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

/// Wire form of [`Properties`]; checked before it becomes one.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PropertiesRecord {
    format: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    bits_per_sample: u16,
    extension: Option<FormatExtension>,
    sample_frames: u32,
    stream_length: u32,
    length_ms: u32,
    bitrate: u32,
}

#[cfg(feature = "serde")]
impl TryFrom<PropertiesRecord> for Properties {
    type Error = &'static str;

    fn try_from(record: PropertiesRecord) -> Result<Self, Self::Error> {
        if record.channels == 0 {
            return Err("channels must be at least 1");
        }
        if record.sample_rate == 0 {
            return Err("sample_rate must be at least 1");
        }
        let length_ms = length_from_rates(
            record.sample_rate,
            record.byte_rate,
            record.sample_frames,
            record.stream_length,
        );
        if record.length_ms != length_ms {
            return Err("length_ms does not follow from the frame count and rates");
        }
        if record.bitrate != bitrate_kbps(record.stream_length, length_ms) {
            return Err("bitrate does not follow from the stream length and length_ms");
        }
        Ok(Self {
            format: record.format,
            channels: record.channels,
            sample_rate: record.sample_rate,
            byte_rate: record.byte_rate,
            bits_per_sample: record.bits_per_sample,
            extension: record.extension,
            sample_frames: record.sample_frames,
            stream_length: record.stream_length,
            length_ms: record.length_ms,
            bitrate: record.bitrate,
        })
    }
}

impl AudioProperties for Properties {
    fn length_in_milliseconds(&self) -> u32 {
        self.length_ms
    }

    fn bitrate(&self) -> u32 {
        self.bitrate
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn resolve_stream_length(buffer_len: usize, hints: &ReadHints) -> u32 {
    hints.stream_length().unwrap_or_else(|| {
        let len = buffer_len.saturating_sub(CANONICAL_HEADER_LEN);
        u32::try_from(len).unwrap_or(u32::MAX)
    })
}

fn resolve_sample_frames(
    format: &FormatChunk,
    fact: Option<u32>,
    stream_length: u32,
    hints: &ReadHints,
) -> u32 {
    if let Some(frames) = hints.total_sample_frames() {
        return frames;
    }
    if let Some(frames) = fact.filter(|&n| n != 0) {
        return frames;
    }
    stream_length.checked_div(format.frame_bytes()).unwrap_or(0)
}

fn length_in_milliseconds(format: &FormatChunk, sample_frames: u32, stream_length: u32) -> u32 {
    length_from_rates(format.sample_rate, format.byte_rate, sample_frames, stream_length)
}

fn length_from_rates(sample_rate: u32, byte_rate: u32, sample_frames: u32, stream_length: u32) -> u32 {
    if sample_frames > 0 {
        let ms = u64::from(sample_frames).saturating_mul(1000);
        return saturate(ms.checked_div(u64::from(sample_rate)).unwrap_or(0));
    }
    let ms = u64::from(stream_length).saturating_mul(1000);
    ms.checked_div(u64::from(byte_rate)).map_or(0, saturate)
}

fn bitrate_kbps(stream_length: u32, length_ms: u32) -> u32 {
    // bits per millisecond == kilobits per second
    let bits = u64::from(stream_length).saturating_mul(8);
    bits.checked_div(u64::from(length_ms)).map_or(0, saturate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
