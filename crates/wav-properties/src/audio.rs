//! Format-independent view of audio properties.

use core::time::Duration;

/// Read-only audio properties shared by every container format.
///
/// Each format module provides its own value type implementing this trait;
/// there is no shared base state. All lengths are truncated, never rounded.
pub trait AudioProperties {
    /// Playback length in milliseconds.
    fn length_in_milliseconds(&self) -> u32;

    /// Average bitrate in kb/s, 0 when the length is unknown.
    fn bitrate(&self) -> u32;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Number of audio channels.
    fn channels(&self) -> u16;

    /// Playback length in whole seconds, rounded down.
    fn length_in_seconds(&self) -> u32 {
        self.length_in_milliseconds() / 1000
    }

    /// Playback length as a [`Duration`].
    fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.length_in_milliseconds()))
    }
}
