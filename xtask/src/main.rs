// Desktop/tooling crate — unwrap/expect/panic acceptable in non-embedded code.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(clippy::use_debug)] // inspect prints FormatTag with {:?}
#![allow(missing_docs)]

mod inspect;
mod scan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "WAV properties development tasks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the audio properties of a single WAV file
    Inspect {
        /// Path to the WAV file
        path: std::path::PathBuf,
        /// Override the stream length in bytes (e.g. the real `data` size)
        #[arg(long)]
        stream_length: Option<u32>,
        /// Override the total sample-frame count
        #[arg(long)]
        total_samples: Option<u32>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Also list every chunk in the file
        #[arg(long)]
        chunks: bool,
    },
    /// Walk a directory and summarise every WAV file found
    Scan {
        /// Directory to scan recursively
        dir: std::path::PathBuf,
        /// Print one JSON object per file instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect {
            path,
            stream_length,
            total_samples,
            json,
            chunks,
        } => inspect::run(&path, stream_length, total_samples, json, chunks),
        Commands::Scan { dir, json } => scan::run(&dir, json),
    }
}
