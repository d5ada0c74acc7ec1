//! `fmt ` chunk decoding and the WAVE format-tag registry.
//!
//! The payload length tells which historical layout was written:
//!
//! | Length  | Layout      | Fields                                              |
//! |---------|-------------|-----------------------------------------------------|
//! | 14–15   | minimal     | tag, channels, rate, byte rate, block align         |
//! | 16–39   | full        | + bits per sample (offset 14)                       |
//! | ≥ 40    | extensible  | + valid bits, channel mask, sub-format GUID (tag `0xFFFE` only) |
//!
//! All fields are little-endian.

use crate::chunk::{read_u16_le, read_u32_le};
use crate::error::PropertiesError;
use crate::logging::debug;

// ---------------------------------------------------------------------------
// FormatTag
// ---------------------------------------------------------------------------

/// Sample encoding named by the `fmt ` chunk's first field.
///
/// Codes follow the registry in `mmreg.h`; anything not listed here is kept
/// verbatim in [`FormatTag::Other`]. Serialized as the bare `u16` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(from = "u16", into = "u16")
)]
pub enum FormatTag {
    /// 0x0000
    Unknown,
    /// 0x0001, integer PCM
    Pcm,
    /// 0x0002, Microsoft ADPCM
    Adpcm,
    /// 0x0003, 32/64-bit IEEE 754 float
    IeeeFloat,
    /// 0x0006, ITU G.711 A-law
    ALaw,
    /// 0x0007, ITU G.711 µ-law
    MuLaw,
    /// 0x0011, IMA/DVI ADPCM
    ImaAdpcm,
    /// 0x0050, MPEG-1 Layer I/II
    Mpeg,
    /// 0x0055, MPEG-1 Layer III
    MpegLayer3,
    /// 0xFFFE, real encoding is in the sub-format GUID
    Extensible,
    /// Any other registered or vendor code.
    Other(u16),
}

impl FormatTag {
    /// Returns `true` for uncompressed integer or float samples, where the
    /// frame count follows from the stream length alone.
    #[must_use]
    pub fn is_linear(self) -> bool {
        matches!(self, Self::Pcm | Self::IeeeFloat)
    }
}

impl From<u16> for FormatTag {
    fn from(code: u16) -> Self {
        match code {
            0x0000 => Self::Unknown,
            0x0001 => Self::Pcm,
            0x0002 => Self::Adpcm,
            0x0003 => Self::IeeeFloat,
            0x0006 => Self::ALaw,
            0x0007 => Self::MuLaw,
            0x0011 => Self::ImaAdpcm,
            0x0050 => Self::Mpeg,
            0x0055 => Self::MpegLayer3,
            0xFFFE => Self::Extensible,
            other => Self::Other(other),
        }
    }
}

impl From<FormatTag> for u16 {
    fn from(tag: FormatTag) -> Self {
        match tag {
            FormatTag::Unknown => 0x0000,
            FormatTag::Pcm => 0x0001,
            FormatTag::Adpcm => 0x0002,
            FormatTag::IeeeFloat => 0x0003,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::ImaAdpcm => 0x0011,
            FormatTag::Mpeg => 0x0050,
            FormatTag::MpegLayer3 => 0x0055,
            FormatTag::Extensible => 0xFFFE,
            FormatTag::Other(code) => code,
        }
    }
}

// ---------------------------------------------------------------------------
// FormatChunk
// ---------------------------------------------------------------------------

/// Which `fmt ` layout a chunk was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FormatLayout {
    /// 14-byte legacy layout without bits per sample.
    Minimal,
    /// 16-byte layout, optionally followed by `cbSize` and extra bytes.
    Full,
    /// `WAVE_FORMAT_EXTENSIBLE` with its 22-byte extension.
    Extensible,
}

/// Fields carried only by the extensible layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FormatExtension {
    /// Bits of actual precision inside each container sample.
    pub valid_bits_per_sample: u16,
    /// Speaker position bitmask (`SPEAKER_FRONT_LEFT` = bit 0, ...).
    pub channel_mask: u32,
    /// Format code taken from the first two bytes of the sub-format GUID.
    pub sub_format: u16,
}

/// Decoded `fmt ` chunk.
///
/// Construction guarantees `channels >= 1` and `sample_rate >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FormatChunk {
    /// Raw format tag (offset 0).
    pub format_tag: u16,
    /// Channel count (offset 2).
    pub channels: u16,
    /// Sample rate in Hz (offset 4).
    pub sample_rate: u32,
    /// Average bytes per second (offset 8).
    pub byte_rate: u32,
    /// Bytes per sample frame as written by the encoder (offset 12).
    pub block_align: u16,
    /// Bits per sample (offset 14); 0 for the minimal layout.
    pub bits_per_sample: u16,
    /// Layout the chunk was decoded from.
    pub layout: FormatLayout,
    /// Extensible-layout fields, if present.
    pub extension: Option<FormatExtension>,
}

impl FormatChunk {
    /// Smallest payload that still carries channels, rate and byte rate.
    pub const MIN_LEN: usize = 14;
    /// Payload length from which `bits_per_sample` is present.
    pub const FULL_LEN: usize = 16;
    /// Payload length of `WAVEFORMATEXTENSIBLE`.
    pub const EXTENSIBLE_LEN: usize = 40;

    /// Decode a `fmt ` payload.
    ///
    /// `data` is whatever part of the payload is present in the buffer; a
    /// truncated chunk is decoded with the layout its available length
    /// allows.
    ///
    /// # Errors
    ///
    /// Returns [`PropertiesError::FormatChunkTooShort`] below 14 bytes,
    /// [`PropertiesError::ZeroChannels`] or [`PropertiesError::ZeroSampleRate`]
    /// when the decoded values violate the WAVE invariants.
    pub fn decode(data: &[u8]) -> Result<Self, PropertiesError> {
        let too_short = PropertiesError::FormatChunkTooShort {
            len: u32::try_from(data.len()).unwrap_or(u32::MAX),
        };
        if data.len() < Self::MIN_LEN {
            debug!("'fmt ' chunk too short: {} bytes", data.len());
            return Err(too_short);
        }

        let format_tag = read_u16_le(data, 0).ok_or(too_short)?;
        let channels = read_u16_le(data, 2).ok_or(too_short)?;
        let sample_rate = read_u32_le(data, 4).ok_or(too_short)?;
        let byte_rate = read_u32_le(data, 8).ok_or(too_short)?;
        let block_align = read_u16_le(data, 12).ok_or(too_short)?;

        if channels == 0 {
            debug!("'fmt ' chunk declares zero channels");
            return Err(PropertiesError::ZeroChannels);
        }
        if sample_rate == 0 {
            debug!("'fmt ' chunk declares zero sample rate");
            return Err(PropertiesError::ZeroSampleRate);
        }

        let (layout, bits_per_sample) = match read_u16_le(data, 14) {
            Some(bits) => (FormatLayout::Full, bits),
            None => (FormatLayout::Minimal, 0),
        };

        let extension = if FormatTag::from(format_tag) == FormatTag::Extensible {
            decode_extension(data)
        } else {
            None
        };
        let layout = if extension.is_some() {
            FormatLayout::Extensible
        } else {
            layout
        };

        Ok(Self {
            format_tag,
            channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            layout,
            extension,
        })
    }

    /// The format tag as a registry value.
    #[must_use]
    pub fn tag(&self) -> FormatTag {
        FormatTag::from(self.format_tag)
    }

    /// Bytes per sample frame as implied by channels and bit depth,
    /// `channels * bits_per_sample / 8`. Zero when the bit depth is absent.
    #[must_use]
    pub fn frame_bytes(&self) -> u32 {
        u32::from(self.channels)
            .saturating_mul(u32::from(self.bits_per_sample))
            .checked_div(8)
            .unwrap_or(0)
    }
}

/// Decode the 22-byte `WAVEFORMATEXTENSIBLE` tail, if fully present.
fn decode_extension(data: &[u8]) -> Option<FormatExtension> {
    if data.len() < FormatChunk::EXTENSIBLE_LEN {
        debug!("extensible 'fmt ' chunk is only {} bytes", data.len());
        return None;
    }
    Some(FormatExtension {
        valid_bits_per_sample: read_u16_le(data, 18)?,
        channel_mask: read_u32_le(data, 20)?,
        sub_format: read_u16_le(data, 24)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;

    fn fmt_payload(tag: u16, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let block_align = channels * (bits / 8);
        let byte_rate = rate * u32::from(block_align);
        let mut out = Vec::new();
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
        out
    }

    fn extensible_payload(sub_format: u16) -> Vec<u8> {
        let mut out = fmt_payload(0xFFFE, 6, 48_000, 24);
        out.extend_from_slice(&22u16.to_le_bytes()); // cbSize
        out.extend_from_slice(&20u16.to_le_bytes()); // valid bits
        out.extend_from_slice(&0x3Fu32.to_le_bytes()); // 5.1 mask
        out.extend_from_slice(&sub_format.to_le_bytes());
        // Remainder of KSDATAFORMAT_SUBTYPE_* GUID
        out.extend_from_slice(&[
            0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
        ]);
        out
    }

    #[test]
    fn full_layout_decodes_all_fields() {
        let fmt = FormatChunk::decode(&fmt_payload(1, 2, 44_100, 16)).unwrap();
        assert_eq!(fmt.tag(), FormatTag::Pcm);
        assert_eq!(fmt.channels, 2);
        assert_eq!(fmt.sample_rate, 44_100);
        assert_eq!(fmt.byte_rate, 176_400);
        assert_eq!(fmt.block_align, 4);
        assert_eq!(fmt.bits_per_sample, 16);
        assert_eq!(fmt.layout, FormatLayout::Full);
        assert!(fmt.extension.is_none());
    }

    #[test]
    fn minimal_layout_has_zero_bits_per_sample() {
        let payload = fmt_payload(2, 1, 22_050, 4);
        let fmt = FormatChunk::decode(&payload[..14]).unwrap();
        assert_eq!(fmt.layout, FormatLayout::Minimal);
        assert_eq!(fmt.bits_per_sample, 0);
        assert_eq!(fmt.frame_bytes(), 0);
    }

    #[test]
    fn fifteen_bytes_is_still_minimal() {
        let payload = fmt_payload(1, 2, 44_100, 16);
        let fmt = FormatChunk::decode(&payload[..15]).unwrap();
        assert_eq!(fmt.layout, FormatLayout::Minimal);
        assert_eq!(fmt.bits_per_sample, 0);
    }

    #[test]
    fn shorter_than_minimal_is_fatal() {
        let payload = fmt_payload(1, 2, 44_100, 16);
        assert_eq!(
            FormatChunk::decode(&payload[..13]),
            Err(PropertiesError::FormatChunkTooShort { len: 13 })
        );
        assert_eq!(
            FormatChunk::decode(&[]),
            Err(PropertiesError::FormatChunkTooShort { len: 0 })
        );
    }

    #[test]
    fn zero_channels_is_fatal() {
        assert_eq!(
            FormatChunk::decode(&fmt_payload(1, 0, 44_100, 16)),
            Err(PropertiesError::ZeroChannels)
        );
    }

    #[test]
    fn zero_sample_rate_is_fatal() {
        assert_eq!(
            FormatChunk::decode(&fmt_payload(1, 2, 0, 16)),
            Err(PropertiesError::ZeroSampleRate)
        );
    }

    #[test]
    fn extensible_layout_decodes_extension() {
        let fmt = FormatChunk::decode(&extensible_payload(0x0001)).unwrap();
        assert_eq!(fmt.layout, FormatLayout::Extensible);
        assert_eq!(fmt.tag(), FormatTag::Extensible);
        let ext = fmt.extension.unwrap();
        assert_eq!(ext.valid_bits_per_sample, 20);
        assert_eq!(ext.channel_mask, 0x3F);
        assert_eq!(ext.sub_format, 0x0001);
        assert_eq!(fmt.bits_per_sample, 24);
    }

    #[test]
    fn truncated_extensible_falls_back_to_full() {
        let payload = extensible_payload(0x0003);
        let fmt = FormatChunk::decode(&payload[..18]).unwrap();
        assert_eq!(fmt.layout, FormatLayout::Full);
        assert!(fmt.extension.is_none());
    }

    #[test]
    fn extension_ignored_for_non_extensible_tag() {
        let mut payload = fmt_payload(1, 2, 44_100, 16);
        payload.resize(40, 0);
        let fmt = FormatChunk::decode(&payload).unwrap();
        assert_eq!(fmt.layout, FormatLayout::Full);
        assert!(fmt.extension.is_none());
    }

    #[test]
    fn frame_bytes_for_stereo_16_bit() {
        let fmt = FormatChunk::decode(&fmt_payload(1, 2, 44_100, 16)).unwrap();
        assert_eq!(fmt.frame_bytes(), 4);
    }

    #[test]
    fn format_tag_codes_round_trip() {
        for code in [0u16, 1, 2, 3, 6, 7, 0x11, 0x50, 0x55, 0xFFFE, 0x1234] {
            assert_eq!(u16::from(FormatTag::from(code)), code);
        }
        assert_eq!(FormatTag::from(0x1234), FormatTag::Other(0x1234));
    }

    #[test]
    fn linear_tags() {
        assert!(FormatTag::Pcm.is_linear());
        assert!(FormatTag::IeeeFloat.is_linear());
        assert!(!FormatTag::Adpcm.is_linear());
        assert!(!FormatTag::Extensible.is_linear());
    }
}
