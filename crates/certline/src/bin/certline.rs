//! # CERTLINE
//!
//! Runs the certificate pipeline and prints both report streams to stdout.
//!
//! ## Usage
//!
//! ```bash
//! certline                       # baseline: entropy seed, runs until killed
//! certline certline.toml         # seed, markup, record/time limits from TOML
//! RUST_LOG=certline=debug certline certline.toml
//! ```
//!
//! Diagnostics go to stderr. Exit code 1 on a fatal configuration violation
//! or an unreadable config file.

use std::process::ExitCode;
use std::sync::Arc;

use certline::{ConsoleSink, Pipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => match PipelineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("certline: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => PipelineConfig::default(),
    };

    match Pipeline::run(&config, Arc::new(ConsoleSink::new())) {
        Ok(report) => {
            tracing::info!(
                produced = report.produced,
                consumed = report.consumed,
                revenue = %report.revenue,
                "clean shutdown"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if e.is_fatal_violation() {
                tracing::error!(error = %e, "aborting");
            }
            eprintln!("certline: {e}");
            ExitCode::FAILURE
        }
    }
}
