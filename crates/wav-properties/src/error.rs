//! Error type returned when a WAVE header cannot yield [`Properties`].
//!
//! Only fatal conditions live here. A missing `fact` chunk, a truncated
//! trailing chunk or a zero-valued hint degrade into zero/estimated field
//! values instead of surfacing as errors.
//!
//! [`Properties`]: crate::Properties

use thiserror_no_std::Error;

/// Fatal failure while reading WAVE properties.
///
/// No partially filled `Properties` value is ever produced alongside one of
/// these; the caller must treat the stream as unreadable for property
/// purposes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertiesError {
    /// Fewer than 12 bytes, or the header is not `RIFF` .... `WAVE`.
    #[error("not a RIFF/WAVE stream")]
    NotRiffWave,
    /// The chunk list contains no `fmt ` chunk.
    #[error("no 'fmt ' chunk found")]
    MissingFormatChunk,
    /// The `fmt ` payload is shorter than the 14-byte minimal layout.
    #[error("'fmt ' chunk is {len} bytes, at least 14 are required")]
    FormatChunkTooShort {
        /// Number of payload bytes actually available.
        len: u32,
    },
    /// The `fmt ` chunk declares zero channels.
    #[error("'fmt ' chunk declares zero channels")]
    ZeroChannels,
    /// The `fmt ` chunk declares a sample rate of 0 Hz.
    #[error("'fmt ' chunk declares a zero sample rate")]
    ZeroSampleRate,
}

impl PropertiesError {
    /// Returns `true` for every variant caused by an absent or unusable
    /// `fmt ` chunk, as opposed to a stream that is not WAVE at all.
    #[must_use]
    pub fn is_malformed_format(&self) -> bool {
        !matches!(self, Self::NotRiffWave)
    }
}
