//! Merge command-line entry point.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use merge::cli::Cli;
use merge::{BuildManager, Settings, log, logger};
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let settings = Settings::load(&cli)?;
    let started = Instant::now();

    let mut manager = BuildManager::new(settings)?;
    let report = manager.execute()?;

    log!(
        "done";
        "{} mapped, {} failed, in {:.2?}",
        report.mapped,
        report.failed,
        started.elapsed()
    );
    Ok(())
}
