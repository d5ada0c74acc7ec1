//! WAV properties — header-only audio property extraction for RIFF/WAVE.
//!
//! Reads channel count, sample rate, bit depth, sample-frame count, format
//! tag, length and bitrate from the `fmt ` and `fact` chunks without touching
//! sample data. No file-system I/O is performed; the caller supplies the
//! bytes.
//!
//! # Modules
//!
//! - [`chunk`] — RIFF header parsing and the chunk scanner
//! - [`format`] — `fmt ` chunk layouts and the format-tag registry
//! - [`properties`] — `Properties`, `ReadHints` and the derived values
//! - [`audio`] — the format-independent `AudioProperties` trait
//! - [`error`] — `PropertiesError`
//!
//! ```
//! use wav_properties::{Properties, ReadHints};
//!
//! let mut wav = Vec::new();
//! wav.extend_from_slice(b"RIFF\x24\x00\x00\x00WAVE");
//! wav.extend_from_slice(b"fmt \x10\x00\x00\x00");
//! wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
//! wav.extend_from_slice(&2u16.to_le_bytes()); // stereo
//! wav.extend_from_slice(&44_100u32.to_le_bytes());
//! wav.extend_from_slice(&176_400u32.to_le_bytes());
//! wav.extend_from_slice(&4u16.to_le_bytes());
//! wav.extend_from_slice(&16u16.to_le_bytes());
//!
//! let props = Properties::read(&wav, ReadHints::AUTO.with_stream_length(352_800))?;
//! assert_eq!(props.sample_frames(), 88_200);
//! assert_eq!(props.length_in_seconds(), 2);
//! assert_eq!(props.bitrate(), 1411);
//! # Ok::<(), wav_properties::PropertiesError>(())
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

mod logging;

pub mod audio;
pub mod chunk;
pub mod error;
pub mod format;
pub mod properties;

// Top-level re-exports for convenience
pub use audio::AudioProperties;
pub use chunk::{Chunk, Chunks, RiffHeader};
pub use error::PropertiesError;
pub use format::{FormatChunk, FormatExtension, FormatLayout, FormatTag};
pub use properties::{Properties, ReadHints};
