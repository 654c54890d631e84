//! Command-line front end for the extraction pipeline.
//!
//! The persistence and asset-serving collaborators described in the
//! original system (`spec.md` §6) are process boundaries this crate only
//! specifies as traits (see `store` and `assets`); this binary exercises
//! the pipeline end to end against the filesystem instead of a running web
//! server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mcq_extract::assets::FsAssetStore;
use mcq_extract::{Config, ExtractError};

/// Extract multiple-choice questions and diagrams from an exam PDF.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the source PDF.
    input: PathBuf,

    /// Directory image assets are written to.
    #[arg(long, default_value = "static/images")]
    images_dir: PathBuf,

    /// URL prefix recorded alongside each saved image.
    #[arg(long, default_value = "/static/images")]
    url_prefix: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let bytes = match std::fs::read(&cli.input) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("could not read {}: {err}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let mut assets = match FsAssetStore::new(&cli.images_dir, &cli.url_prefix) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("could not prepare {}: {err}", cli.images_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let config = Config::default();
    match mcq_extract::extract(&bytes, &config, &mut assets) {
        Ok(output) => {
            let json = serde_json::to_string_pretty(&output.records)
                .expect("QuestionRecord serialization cannot fail");
            println!("{json}");
            eprintln!("extracted {} question(s)", output.records.len());
            ExitCode::SUCCESS
        }
        Err(ExtractError::IngestFormat(msg)) => {
            eprintln!("only PDF files are accepted: {msg}");
            ExitCode::FAILURE
        }
        Err(ExtractError::IngestRead(msg)) => {
            eprintln!("PDF read error: {msg}");
            ExitCode::FAILURE
        }
        Err(err @ ExtractError::NoQuestions) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
