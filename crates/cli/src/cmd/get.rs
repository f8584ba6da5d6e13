//! Export a past version to a file

use super::CliEngine;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(engine: &CliEngine, document: &Path, version: i64, output: &Path) -> Result<()> {
    let version = super::version_number(engine, document, version)?;
    let bytes = engine
        .get(document, version, output)
        .with_context(|| format!("Failed to export version {} of {}", version, document.display()))?;

    println!(
        "{} Wrote version {} to {} ({})",
        "✓".green(),
        version,
        output.display(),
        util::format_size(bytes)
    );
    Ok(())
}
