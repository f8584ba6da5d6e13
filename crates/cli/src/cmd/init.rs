//! Start tracking a document

use super::CliEngine;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use quill_journal::{DocumentType, InitOutcome};
use std::path::Path;

pub fn run(
    engine: &CliEngine,
    document: &Path,
    document_type: DocumentType,
    interval: u32,
    message: &str,
) -> Result<()> {
    let outcome = engine
        .init(document, document_type, interval, message)
        .with_context(|| format!("Failed to initialize repository for {}", document.display()))?;

    match outcome {
        InitOutcome::Created { repo_dir, bytes } => {
            println!(
                "{} Initialized {} repository at {}",
                "✓".green(),
                document_type,
                repo_dir.display()
            );
            println!(
                "  Stored version 1 ({}), snapshot every {} versions",
                util::format_size(bytes),
                interval
            );
        }
        InitOutcome::AlreadyInitialized {
            repo_dir,
            latest_version,
        } => {
            println!(
                "{} Repository already initialized at {}",
                "!".yellow(),
                repo_dir.display()
            );
            println!("  Latest version: {}", latest_version);
        }
    }

    Ok(())
}
