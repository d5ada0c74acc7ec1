//! End-to-end property extraction over synthetic RIFF/WAVE buffers.
//!
//! Buffers are assembled in memory; no fixture files are needed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation
)]

use wav_properties::{AudioProperties, FormatTag, Properties, PropertiesError, ReadHints};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Assemble a RIFF/WAVE buffer from `(id, payload)` pairs, padding odd chunks.
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

fn fmt(tag: u16, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * bits.div_ceil(8);
    let mut out = Vec::new();
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&(rate * u32::from(block_align)).to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits.to_le_bytes());
    out
}

fn cd_fmt() -> Vec<u8> {
    fmt(1, 2, 44_100, 16)
}

// ---------------------------------------------------------------------------
// Format chunk layouts
// ---------------------------------------------------------------------------

#[test]
fn canonical_pcm_without_fact_derives_frames_from_stream_length() {
    let samples = vec![0u8; 44_100 * 4];
    let buf = riff(&[(b"fmt ", &cd_fmt()), (b"data", &samples)]);
    assert_eq!(buf.len(), 44 + samples.len());

    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.format_tag(), FormatTag::Pcm);
    assert_eq!(props.channels(), 2);
    assert_eq!(props.sample_rate(), 44_100);
    assert_eq!(props.bits_per_sample(), 16);
    assert_eq!(props.stream_length(), 176_400);
    assert_eq!(props.sample_frames(), props.stream_length() / 4);
    assert_eq!(props.length_in_milliseconds(), 1000);
    assert_eq!(props.length_in_seconds(), 1);
    assert_eq!(props.bitrate(), 1411);
}

#[test]
fn stream_length_hint_drives_frame_derivation() {
    let buf = riff(&[(b"fmt ", &cd_fmt())]);
    let props = Properties::read(&buf, ReadHints::AUTO.with_stream_length(1_000_000)).unwrap();
    assert_eq!(props.stream_length(), 1_000_000);
    assert_eq!(props.sample_frames(), 250_000);
}

#[test]
fn legacy_fourteen_byte_fmt_reports_zero_bits() {
    let payload = fmt(2, 1, 22_050, 4);
    let buf = riff(&[(b"fmt ", &payload[..14])]);
    let props = Properties::read(&buf, ReadHints::AUTO.with_stream_length(11_025)).unwrap();
    assert_eq!(props.bits_per_sample(), 0);
    assert_eq!(props.format_tag(), FormatTag::Adpcm);
    assert_eq!(props.sample_frames(), 0);
}

#[test]
fn legacy_fmt_falls_back_to_byte_rate_length() {
    let mut payload = fmt(2, 1, 22_050, 4);
    payload[8..12].copy_from_slice(&11_155u32.to_le_bytes());
    let buf = riff(&[(b"fmt ", &payload[..14])]);
    let props = Properties::read(&buf, ReadHints::AUTO.with_stream_length(22_310)).unwrap();
    assert_eq!(props.length_in_milliseconds(), 2000);
    assert_eq!(props.bitrate(), 89);
}

#[test]
fn extensible_fmt_exposes_sub_format() {
    let mut payload = fmt(0xFFFE, 2, 96_000, 32);
    payload.extend_from_slice(&22u16.to_le_bytes());
    payload.extend_from_slice(&32u16.to_le_bytes());
    payload.extend_from_slice(&0x3u32.to_le_bytes());
    payload.extend_from_slice(&3u16.to_le_bytes());
    payload.extend_from_slice(&[0u8; 14]);
    let buf = riff(&[(b"fmt ", &payload), (b"data", &[0u8; 64])]);

    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.format_tag(), FormatTag::Extensible);
    assert_eq!(props.sub_format(), Some(FormatTag::IeeeFloat));
    assert_eq!(props.channel_mask(), Some(0x3));
    assert_eq!(props.valid_bits_per_sample(), Some(32));
    assert_eq!(props.bits_per_sample(), 32);
}

#[test]
fn plain_pcm_has_no_extension_fields() {
    let buf = riff(&[(b"fmt ", &cd_fmt())]);
    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.sub_format(), None);
    assert_eq!(props.channel_mask(), None);
    assert_eq!(props.valid_bits_per_sample(), None);
}

// ---------------------------------------------------------------------------
// fact chunk and hints
// ---------------------------------------------------------------------------

#[test]
fn fact_chunk_sets_frames_and_duration() {
    let buf = riff(&[
        (b"fmt ", &fmt(2, 2, 44_100, 4)),
        (b"fact", &88_200u32.to_le_bytes()),
        (b"data", &[0u8; 32]),
    ]);
    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.sample_frames(), 88_200);
    assert_eq!(props.length_in_milliseconds(), 2000);
}

#[test]
fn fact_before_fmt_is_still_used() {
    let buf = riff(&[(b"fact", &88_200u32.to_le_bytes()), (b"fmt ", &cd_fmt())]);
    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.sample_frames(), 88_200);
    assert_eq!(props.length_in_milliseconds(), 2000);
}

#[test]
fn frames_hint_overrides_fact() {
    let buf = riff(&[(b"fmt ", &cd_fmt()), (b"fact", &88_200u32.to_le_bytes())]);
    let hints = ReadHints::AUTO
        .with_stream_length(176_400)
        .with_total_sample_frames(44_100);
    let props = Properties::read(&buf, hints).unwrap();
    assert_eq!(props.sample_frames(), 44_100);
    assert_eq!(props.length_in_milliseconds(), 1000);
}

#[test]
fn zero_hints_behave_like_no_hints() {
    let buf = riff(&[(b"fmt ", &cd_fmt()), (b"data", &[0u8; 400])]);
    let auto = Properties::from_bytes(&buf).unwrap();
    let zeroed = Properties::read(
        &buf,
        ReadHints::AUTO
            .with_stream_length(0)
            .with_total_sample_frames(0),
    )
    .unwrap();
    assert_eq!(auto, zeroed);
}

#[test]
fn only_first_fact_chunk_counts() {
    let buf = riff(&[
        (b"fmt ", &fmt(2, 1, 8_000, 4)),
        (b"fact", &8_000u32.to_le_bytes()),
        (b"fact", &16_000u32.to_le_bytes()),
    ]);
    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.sample_frames(), 8_000);
}

#[test]
fn short_fact_chunk_is_ignored() {
    let buf = riff(&[(b"fmt ", &cd_fmt()), (b"fact", &[1u8, 2])]);
    let props = Properties::read(&buf, ReadHints::AUTO.with_stream_length(400)).unwrap();
    assert_eq!(props.sample_frames(), 100);
}

// ---------------------------------------------------------------------------
// Degraded and fatal inputs
// ---------------------------------------------------------------------------

#[test]
fn zero_duration_means_zero_bitrate() {
    let mut payload = fmt(2, 1, 8_000, 4);
    payload[8..12].copy_from_slice(&0u32.to_le_bytes());
    let buf = riff(&[(b"fmt ", &payload[..14])]);
    let props = Properties::read(&buf, ReadHints::AUTO.with_stream_length(4_000)).unwrap();
    assert_eq!(props.length_in_milliseconds(), 0);
    assert_eq!(props.bitrate(), 0);
}

#[test]
fn overrunning_last_chunk_keeps_earlier_fmt() {
    let mut buf = riff(&[(b"fmt ", &cd_fmt())]);
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&u32::MAX.to_le_bytes());
    buf.extend_from_slice(&[0u8; 100]);

    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.channels(), 2);
    assert_eq!(props.sample_rate(), 44_100);
}

#[test]
fn unknown_chunks_are_skipped() {
    let buf = riff(&[
        (b"JUNK", &[0u8; 27]),
        (b"LIST", b"INFOISFT\x04\x00\x00\x00abc\x00"),
        (b"fmt ", &cd_fmt()),
    ]);
    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.bits_per_sample(), 16);
}

#[test]
fn missing_fmt_is_fatal() {
    let buf = riff(&[(b"data", &[0u8; 16])]);
    assert_eq!(
        Properties::from_bytes(&buf),
        Err(PropertiesError::MissingFormatChunk)
    );
}

#[test]
fn short_fmt_is_fatal() {
    let buf = riff(&[(b"fmt ", &cd_fmt()[..12])]);
    let err = Properties::from_bytes(&buf).unwrap_err();
    assert_eq!(err, PropertiesError::FormatChunkTooShort { len: 12 });
    assert!(err.is_malformed_format());
}

#[test]
fn first_fmt_wins_even_if_malformed() {
    let buf = riff(&[(b"fmt ", &cd_fmt()[..10]), (b"fmt ", &cd_fmt())]);
    assert!(Properties::from_bytes(&buf).is_err());
}

#[test]
fn truncated_fmt_uses_available_bytes() {
    let mut buf = riff(&[]);
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&cd_fmt()[..14]);
    let props = Properties::from_bytes(&buf).unwrap();
    assert_eq!(props.channels(), 2);
    assert_eq!(props.bits_per_sample(), 0);
}

#[test]
fn non_wave_riff_is_rejected() {
    let mut buf = riff(&[(b"fmt ", &cd_fmt())]);
    buf[8..12].copy_from_slice(b"AVI ");
    assert_eq!(Properties::from_bytes(&buf), Err(PropertiesError::NotRiffWave));
}

#[test]
fn empty_and_tiny_buffers_are_rejected() {
    assert_eq!(Properties::from_bytes(&[]), Err(PropertiesError::NotRiffWave));
    assert_eq!(
        Properties::from_bytes(b"RIFF\x04\x00\x00\x00WAVE"),
        Err(PropertiesError::MissingFormatChunk)
    );
}

// ---------------------------------------------------------------------------
// Determinism and trait surface
// ---------------------------------------------------------------------------

#[test]
fn reading_twice_is_identical() {
    let buf = riff(&[
        (b"fmt ", &cd_fmt()),
        (b"fact", &1234u32.to_le_bytes()),
        (b"data", &[0u8; 48]),
    ]);
    let hints = ReadHints::AUTO.with_stream_length(48);
    assert_eq!(
        Properties::read(&buf, hints).unwrap(),
        Properties::read(&buf, hints).unwrap()
    );
}

#[test]
fn properties_outlive_the_buffer() {
    let props = {
        let buf = riff(&[(b"fmt ", &cd_fmt()), (b"data", &[0u8; 8])]);
        Properties::from_bytes(&buf).unwrap()
    };
    assert_eq!(props.sample_frames(), 2);
}

#[test]
fn audio_properties_trait_matches_accessors() {
    let buf = riff(&[(b"fmt ", &cd_fmt()), (b"fact", &132_300u32.to_le_bytes())]);
    let props = Properties::read(&buf, ReadHints::AUTO.with_stream_length(529_200)).unwrap();
    let dyn_props: &dyn AudioProperties = &props;
    assert_eq!(dyn_props.length_in_seconds(), 3);
    assert_eq!(dyn_props.length_in_milliseconds(), 3000);
    assert_eq!(dyn_props.bitrate(), 1411);
    assert_eq!(dyn_props.sample_rate(), 44_100);
    assert_eq!(dyn_props.channels(), 2);
    assert_eq!(dyn_props.duration(), std::time::Duration::from_secs(3));
}
