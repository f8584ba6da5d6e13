//! Restore the tracked document to a past version

use super::CliEngine;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(engine: &CliEngine, document: &Path, version: i64) -> Result<()> {
    let version = super::version_number(engine, document, version)?;
    engine
        .revert(document, version)
        .with_context(|| format!("Failed to revert {} to version {}", document.display(), version))?;

    println!(
        "{} Restored {} to version {}",
        "✓".green(),
        document.display(),
        version
    );
    println!(
        "  {} Run `quill add` to record the restored content as a new version",
        "→".dimmed()
    );
    Ok(())
}
