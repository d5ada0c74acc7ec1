//! Chunk scanner — walks the RIFF chunk list of a WAVE stream.
//!
//! No I/O is performed here; the caller supplies the complete header buffer.
//!
//! Layout of a RIFF/WAVE stream:
//!
//! ```text
//! [0..4]   magic        b"RIFF"
//! [4..8]   riff_size    u32 le  (bytes following this field)
//! [8..12]  form_type    b"WAVE"
//! [12..]   chunks       id: [u8; 4], size: u32 le, payload, pad to even
//! ```
//!
//! The scanner never fails. A chunk whose declared size runs past the end of
//! the buffer is yielded with its payload cut to the available bytes, and the
//! walk stops after it.

use crate::logging::{debug, trace};

/// Length of the `RIFF` + size + form-type header.
pub const RIFF_HEADER_LEN: usize = 12;

/// Length of a chunk header (4-byte id + 4-byte little-endian size).
pub const CHUNK_HEADER_LEN: usize = 8;

// ---------------------------------------------------------------------------
// RiffHeader
// ---------------------------------------------------------------------------

/// The 12-byte header that opens every RIFF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RiffHeader {
    /// Size field of the outer `RIFF` chunk; may disagree with the real
    /// stream length.
    pub riff_size: u32,
    /// Form type, `WAVE` for audio.
    pub form_type: [u8; 4],
}

impl RiffHeader {
    /// Magic bytes opening every RIFF stream.
    pub const MAGIC: &'static [u8; 4] = b"RIFF";
    /// Form type of audio streams.
    pub const WAVE: &'static [u8; 4] = b"WAVE";

    /// Parse the first 12 bytes of `data`.
    ///
    /// Returns `None` when fewer than 12 bytes are available or the magic is
    /// not `RIFF`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.get(0..4)? != Self::MAGIC.as_ref() {
            return None;
        }
        let riff_size = read_u32_le(data, 4)?;
        let form_type: [u8; 4] = data.get(8..12)?.try_into().ok()?;
        Some(Self { riff_size, form_type })
    }

    /// Returns `true` when the form type is `WAVE`.
    #[must_use]
    pub fn is_wave(&self) -> bool {
        &self.form_type == Self::WAVE
    }
}

// ---------------------------------------------------------------------------
// Chunk
// ---------------------------------------------------------------------------

/// A single chunk record borrowed from the scanned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    id: [u8; 4],
    declared_size: u32,
    offset: usize,
    data: &'a [u8],
}

impl<'a> Chunk<'a> {
    /// Four-byte chunk identifier, e.g. `*b"fmt "`.
    #[must_use]
    pub fn id(&self) -> [u8; 4] {
        self.id
    }

    /// The identifier as text, if it is valid UTF-8.
    #[must_use]
    pub fn id_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.id).ok()
    }

    /// Size from the chunk header. May exceed [`Chunk::data`]'s length when
    /// the chunk is truncated.
    #[must_use]
    pub fn declared_size(&self) -> u32 {
        self.declared_size
    }

    /// Byte offset of the payload within the scanned buffer.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Payload bytes that are actually present in the buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns `true` when the declared size runs past the buffer end.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        u32::try_from(self.data.len()).map_or(false, |len| len < self.declared_size)
    }
}

// ---------------------------------------------------------------------------
// Chunks
// ---------------------------------------------------------------------------

/// Lazy iterator over the chunks of a RIFF buffer.
///
/// A clone continues from the current position. Call [`Chunks::new`] again
/// to restart from the first chunk.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    /// Walk the chunks following the 12-byte RIFF header.
    ///
    /// The header itself is not validated; see [`RiffHeader::parse`].
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::starting_at(data, RIFF_HEADER_LEN)
    }

    /// Walk the chunks starting at an arbitrary `offset`, e.g. the payload
    /// of a `LIST` chunk.
    #[must_use]
    pub fn starting_at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            pos: offset,
            done: false,
        }
    }

    /// Return the first remaining chunk whose id equals `id`.
    pub fn find_id(mut self, id: &[u8; 4]) -> Option<Chunk<'a>> {
        self.by_ref().find(|chunk| &chunk.id == id)
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Chunk<'a>> {
        if self.done {
            return None;
        }

        let Some((id, declared_size)) = read_chunk_header(self.data, self.pos) else {
            self.done = true;
            return None;
        };

        // pos + 8 cannot overflow: read_chunk_header proved pos + 8 <= len.
        let offset = self.pos.saturating_add(CHUNK_HEADER_LEN);
        let available = self.data.len().saturating_sub(offset);
        let wanted = usize::try_from(declared_size).unwrap_or(usize::MAX);

        let payload_len = if wanted > available {
            debug!(
                "chunk at {} declares {} bytes, only {} available",
                self.pos, declared_size, available
            );
            self.done = true;
            available
        } else {
            // offset + wanted <= len, so neither addition can overflow.
            let end = offset.saturating_add(wanted);
            self.pos = end.saturating_add(wanted & 1);
            wanted
        };

        let data = self
            .data
            .get(offset..offset.saturating_add(payload_len))
            .unwrap_or(&[]);

        trace!(
            "chunk {} size {} at {}",
            core::str::from_utf8(&id).unwrap_or("????"),
            declared_size,
            offset
        );

        Some(Chunk {
            id,
            declared_size,
            offset,
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Byte helpers
// ---------------------------------------------------------------------------

/// Read a chunk id and size at `pos`, or `None` if fewer than 8 bytes remain.
fn read_chunk_header(data: &[u8], pos: usize) -> Option<([u8; 4], u32)> {
    let end = pos.checked_add(CHUNK_HEADER_LEN)?;
    let header = data.get(pos..end)?;
    let id: [u8; 4] = header.get(0..4)?.try_into().ok()?;
    let size = read_u32_le(header, 4)?;
    Some((id, size))
}

pub(crate) fn read_u16_le(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

pub(crate) fn read_u32_le(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;

    fn riff(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        for (id, payload) in chunks {
            out.extend_from_slice(*id);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                out.push(0);
            }
        }
        let size = (out.len() - 8) as u32;
        out[4..8].copy_from_slice(&size.to_le_bytes());
        out
    }

    #[test]
    fn header_parses_riff_wave() {
        let buf = riff(&[]);
        let header = RiffHeader::parse(&buf).unwrap();
        assert!(header.is_wave());
        assert_eq!(header.riff_size, 4);
    }

    #[test]
    fn header_rejects_wrong_magic() {
        assert!(RiffHeader::parse(b"RIFX\x04\x00\x00\x00WAVE").is_none());
    }

    #[test]
    fn header_rejects_short_buffer() {
        assert!(RiffHeader::parse(b"RIFF\x04\x00").is_none());
    }

    #[test]
    fn header_reports_non_wave_form() {
        let header = RiffHeader::parse(b"RIFF\x04\x00\x00\x00AVI ").unwrap();
        assert!(!header.is_wave());
    }

    #[test]
    fn walks_chunks_in_order() {
        let buf = riff(&[(b"fmt ", &[1u8; 16]), (b"data", &[0u8; 8])]);
        let ids: Vec<[u8; 4]> = Chunks::new(&buf).map(|c| c.id()).collect();
        assert_eq!(ids, vec![*b"fmt ", *b"data"]);
    }

    #[test]
    fn payload_offset_and_bytes() {
        let buf = riff(&[(b"abcd", &[7u8; 4])]);
        let chunk = Chunks::new(&buf).next().unwrap();
        assert_eq!(chunk.offset(), 20);
        assert_eq!(chunk.declared_size(), 4);
        assert_eq!(chunk.data(), &[7u8; 4]);
        assert!(!chunk.is_truncated());
    }

    #[test]
    fn odd_sized_chunk_skips_pad_byte() {
        let buf = riff(&[(b"odd ", &[9u8; 3]), (b"next", &[1u8; 2])]);
        let chunks: Vec<_> = Chunks::new(&buf).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].id(), *b"next");
        // 12 header + 8 + 3 payload + 1 pad + 8
        assert_eq!(chunks[1].offset(), 32);
    }

    #[test]
    fn overrunning_chunk_is_truncated_and_ends_walk() {
        let mut buf = riff(&[(b"fmt ", &[1u8; 16])]);
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&1000u32.to_le_bytes());
        buf.extend_from_slice(&[0u8; 10]);

        let chunks: Vec<_> = Chunks::new(&buf).collect();
        assert_eq!(chunks.len(), 2);
        let data = chunks[1];
        assert_eq!(data.id(), *b"data");
        assert_eq!(data.declared_size(), 1000);
        assert_eq!(data.data().len(), 10);
        assert!(data.is_truncated());
    }

    #[test]
    fn max_declared_size_terminates() {
        let mut buf = riff(&[]);
        buf.extend_from_slice(b"junk");
        buf.extend_from_slice(&u32::MAX.to_le_bytes());
        buf.extend_from_slice(b"fmt ");

        let chunks: Vec<_> = Chunks::new(&buf).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data(), b"fmt ");
    }

    #[test]
    fn trailing_bytes_shorter_than_header_are_ignored() {
        let mut buf = riff(&[(b"fmt ", &[1u8; 16])]);
        buf.extend_from_slice(&[0u8; 7]);
        assert_eq!(Chunks::new(&buf).count(), 1);
    }

    #[test]
    fn empty_after_header_yields_nothing() {
        let buf = riff(&[]);
        assert_eq!(Chunks::new(&buf).count(), 0);
        assert_eq!(Chunks::new(&[]).count(), 0);
    }

    #[test]
    fn find_returns_first_match() {
        let buf = riff(&[(b"fact", &1u32.to_le_bytes()), (b"fact", &2u32.to_le_bytes())]);
        let fact = Chunks::new(&buf).find_id(b"fact").unwrap();
        assert_eq!(read_u32_le(fact.data(), 0), Some(1));
        assert!(Chunks::new(&buf).find_id(b"fmt ").is_none());
    }

    #[test]
    fn walk_is_restartable() {
        let buf = riff(&[(b"fmt ", &[1u8; 16]), (b"data", &[0u8; 4])]);
        let first: Vec<_> = Chunks::new(&buf).collect();
        let second: Vec<_> = Chunks::new(&buf).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn id_str_reads_ascii_ids() {
        let buf = riff(&[(b"LIST", &[0u8; 4])]);
        assert_eq!(Chunks::new(&buf).next().unwrap().id_str(), Some("LIST"));
    }

    #[test]
    fn little_endian_helpers_bounds_check() {
        let bytes = [0x34, 0x12, 0x78, 0x56];
        assert_eq!(read_u16_le(&bytes, 0), Some(0x1234));
        assert_eq!(read_u32_le(&bytes, 0), Some(0x5678_1234));
        assert_eq!(read_u16_le(&bytes, 3), None);
        assert_eq!(read_u32_le(&bytes, 1), None);
        assert_eq!(read_u32_le(&bytes, usize::MAX), None);
    }
}
