//! Check that every version can be reconstructed

use super::CliEngine;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(engine: &CliEngine, document: &Path) -> Result<()> {
    let report = engine.verify(document)?;

    if report.is_ok() {
        println!(
            "{} All {} versions reconstruct and match their checksums",
            "✓".green(),
            report.checked
        );
        return Ok(());
    }

    for (version, error) in &report.failures {
        println!("{} v{}: {}", "✗".red(), version, error);
    }

    anyhow::bail!(
        "{} of {} versions failed verification",
        report.failures.len(),
        report.checked
    )
}
