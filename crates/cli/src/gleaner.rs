//! gleaner - extract a PDF's text to a file.
//!
//! Reads the source PDF, extracts the text of every page, and writes it
//! to the destination as UTF-8 in one shot. The outcome is reported as a
//! single stdout line, `Success` or `Error: <description>`, and the exit
//! code stays zero either way; the printed line is the interface.

use std::path::PathBuf;

use clap::Parser;
use gleaner_core::extract_to_file;

/// Extract a PDF's text to a UTF-8 file.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(author, version, about)]
struct Args {
    /// Path of the PDF to read
    source: PathBuf,

    /// Path of the text file to write (replaced if it already exists)
    dest: PathBuf,
}

fn main() {
    let args = Args::parse();

    // Diagnostics go to stderr, gated by RUST_LOG; stdout carries only
    // the outcome line.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match extract_to_file(&args.source, &args.dest) {
        Ok(()) => println!("Success"),
        Err(err) => println!("Error: {err}"),
    }
}
