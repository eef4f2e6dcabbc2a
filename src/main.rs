//! Command-line entry point.
//!
//! ```text
//! voice-prosody <audio_file>
//! ```
//!
//! Prints the prosody report as pretty JSON on stdout. Any failure prints a
//! message on stderr, leaves stdout empty and exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use voice_prosody::{extract_prosodic_features, ProsodyConfig};

const USAGE: &str = "Usage: voice-prosody <audio_file>";

/// Extract prosodic and voice-quality features from an audio file
#[derive(Parser, Debug)]
#[clap(name = "voice-prosody", version)]
struct Args {
    /// Audio file to analyse (WAV, MP3, FLAC or AAC)
    audio_file: PathBuf,
}

fn run(args: &Args) -> anyhow::Result<String> {
    let report = extract_prosodic_features(&args.audio_file, &ProsodyConfig::default())
        .with_context(|| format!("failed to analyse {}", args.audio_file.display()))?;
    report.to_json_pretty().context("failed to serialise report")
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // --help and --version are not failures
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            log::debug!("argument error: {}", err);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error processing audio: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
