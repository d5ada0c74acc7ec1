//! xtask scan — walk a directory and summarise every WAV file.
//!
//! Files are read whole; unreadable or non-WAVE files are reported and
//! counted, never fatal.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use wav_properties::Properties;
use walkdir::WalkDir;

const WAV_EXTENSIONS: &[&str] = &["wav", "wave"];

/// Per-directory totals printed at the end of a scan.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ScanSummary {
    pub(crate) readable: usize,
    pub(crate) failed: usize,
    pub(crate) total_ms: u64,
}

/// Entry point called from main.rs
pub fn run(dir: &Path, json: bool) -> Result<()> {
    if !json {
        println!("Scanning: {}", dir.display());
    }
    let summary = scan_dir(dir, json)?;
    if !json {
        println!();
        println!(
            "{}",
            format!(
                "{} readable, {} failed, {} s total",
                summary.readable,
                summary.failed,
                summary.total_ms / 1000
            )
            .green()
        );
    }
    Ok(())
}

/// Read every WAV file under `dir`, printing one line (or JSON object) each.
pub(crate) fn scan_dir(dir: &Path, json: bool) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();
    for path in scan_wav_files(dir)? {
        match read_properties(&path) {
            Ok(props) => {
                summary.readable = summary.readable.saturating_add(1);
                summary.total_ms = summary
                    .total_ms
                    .saturating_add(u64::from(props.length_in_milliseconds()));
                if json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "path": path.display().to_string(),
                            "properties": props,
                        })
                    );
                } else {
                    println!("{}", summary_line(&path, &props));
                }
            }
            Err(err) => {
                summary.failed = summary.failed.saturating_add(1);
                tracing::debug!(path = %path.display(), "skipping: {err:#}");
                if !json {
                    eprintln!("{} {}: {err:#}", "✗".red(), path.display());
                }
            }
        }
    }
    Ok(summary)
}

/// `true` for `.wav`/`.wave` files, whatever the case of the extension.
pub(crate) fn is_wav_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WAV_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// WAV files under `dir` in file-name order, subdirectories included.
pub(crate) fn scan_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter(|entry| {
            entry
                .as_ref()
                .map_or(true, |e| e.file_type().is_file() && is_wav_path(e.path()))
        })
        .map(|entry| {
            entry
                .map(walkdir::DirEntry::into_path)
                .map_err(anyhow::Error::from)
        })
        .collect()
}

fn read_properties(path: &Path) -> Result<Properties> {
    let data = std::fs::read(path)?;
    Ok(Properties::from_bytes(&data)?)
}

/// `"{path}  {channels}ch {rate} Hz {bits}-bit  {m}:{ss}  {kbps} kb/s"`
fn summary_line(path: &Path, props: &Properties) -> String {
    let secs = props.length_in_seconds();
    format!(
        "{}  {}ch {} Hz {}-bit  {}:{:02}  {} kb/s",
        path.display(),
        props.channels(),
        props.sample_rate(),
        props.bits_per_sample(),
        secs / 60,
        secs % 60,
        props.bitrate()
    )
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn pcm_wav(seconds: u32) -> Vec<u8> {
        let data_len = seconds.saturating_mul(8_000);
        let mut buf = b"RIFF\x00\x00\x00\x00WAVEfmt \x10\x00\x00\x00".to_vec();
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&8_000u32.to_le_bytes());
        buf.extend_from_slice(&8_000u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&8u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        buf.resize(buf.len().saturating_add(data_len as usize), 0x80);
        buf
    }

    fn create_fake_library(dir: &TempDir) {
        let album = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&album).unwrap();
        fs::write(album.join("01 - Intro.wav"), pcm_wav(2)).unwrap();
        fs::write(album.join("02 - Outro.WAV"), pcm_wav(3)).unwrap();
        fs::write(album.join("03 - Broken.wav"), b"not a wav").unwrap();
        fs::write(album.join("cover.jpg"), b"FAKE").unwrap();
    }

    #[test]
    fn scan_finds_wav_files_case_insensitively() {
        let tmp = TempDir::new().unwrap();
        create_fake_library(&tmp);
        let files = scan_wav_files(tmp.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| !p.ends_with("cover.jpg")));
    }

    #[test]
    fn wav_extension_check() {
        assert!(is_wav_path(Path::new("a/b.wav")));
        assert!(is_wav_path(Path::new("B.WaVe")));
        assert!(!is_wav_path(Path::new("wav")));
        assert!(!is_wav_path(Path::new("take.wav.bak")));
        assert!(!is_wav_path(Path::new("cover.jpg")));
    }

    #[test]
    fn scan_counts_readable_and_failed() {
        let tmp = TempDir::new().unwrap();
        create_fake_library(&tmp);
        let summary = scan_dir(tmp.path(), false).unwrap();
        assert_eq!(
            summary,
            ScanSummary {
                readable: 2,
                failed: 1,
                total_ms: 5_000,
            }
        );
    }

    #[test]
    fn summary_line_formats_minutes_and_seconds() {
        let wav = pcm_wav(75);
        let props = Properties::from_bytes(&wav).unwrap();
        let line = summary_line(Path::new("a.wav"), &props);
        assert_eq!(line, "a.wav  1ch 8000 Hz 8-bit  1:15  64 kb/s");
    }

    #[test]
    fn scan_missing_dir_is_err() {
        let tmp = TempDir::new().unwrap();
        assert!(scan_dir(&tmp.path().join("missing"), false).is_err());
    }
}
