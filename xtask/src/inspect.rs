//! xtask inspect — print the properties of one WAV file.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use wav_properties::{Chunks, Properties, ReadHints};

/// Entry point called from main.rs
pub fn run(
    path: &Path,
    stream_length: Option<u32>,
    total_samples: Option<u32>,
    json: bool,
    list_chunks: bool,
) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let hints = ReadHints {
        stream_length,
        total_sample_frames: total_samples,
    };
    let props = Properties::read(&data, hints)
        .with_context(|| format!("cannot read WAV properties of {}", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&props)?);
        return Ok(());
    }

    println!("{}", path.display().to_string().cyan().bold());
    for (label, value) in describe(&props) {
        println!("  {:<18} {}", label, value);
    }

    if list_chunks {
        println!();
        println!("{}", "  Chunks".cyan());
        for chunk in Chunks::new(&data) {
            let line = format!(
                "  {:<6} offset {:>10}  size {:>10}",
                chunk.id_str().unwrap_or("????"),
                chunk.offset(),
                chunk.declared_size()
            );
            if chunk.is_truncated() {
                println!("{} {}", line.yellow(), "(truncated)".yellow());
            } else {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// Label/value pairs shown by `inspect`, in display order.
pub(crate) fn describe(props: &Properties) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        (
            "format",
            format!("{:?} (0x{:04X})", props.format_tag(), props.format()),
        ),
        ("channels", props.channels().to_string()),
        ("sample rate", format!("{} Hz", props.sample_rate())),
        ("bits per sample", props.bits_per_sample().to_string()),
        ("sample frames", props.sample_frames().to_string()),
        ("stream length", format!("{} bytes", props.stream_length())),
        ("length", format!("{} ms", props.length_in_milliseconds())),
        ("bitrate", format!("{} kb/s", props.bitrate())),
    ];
    if let Some(sub) = props.sub_format() {
        rows.push(("sub-format", format!("{:?}", sub)));
    }
    if let Some(mask) = props.channel_mask() {
        rows.push(("channel mask", format!("0x{:08X}", mask)));
    }
    if let Some(bits) = props.valid_bits_per_sample() {
        rows.push(("valid bits", bits.to_string()));
    }
    rows
}
