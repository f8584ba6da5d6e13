//! Commit the current document contents

use super::CliEngine;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use quill_core::PatchService;
use quill_journal::DocumentType;
use std::path::Path;

pub fn run(
    engine: &CliEngine,
    document: &Path,
    document_type: Option<DocumentType>,
    message: &str,
) -> Result<()> {
    if let Some(requested) = document_type {
        let repository = engine.load(document)?;
        if repository.document_type != requested {
            tracing::warn!(
                "Ignoring --type {}: repository tracks a {} document",
                requested,
                repository.document_type
            );
        }
    }

    let summary = engine
        .add(document, message)
        .with_context(|| format!("Failed to add a version of {}", document.display()))?;

    println!(
        "{} Added version {} ({}, {} stored for a {} document)",
        "✓".green(),
        summary.version.to_string().yellow(),
        summary.kind,
        util::format_size(summary.stored_bytes),
        util::format_size(summary.document_bytes)
    );

    if summary.fallback {
        println!(
            "  {} Delta encoding with {} failed; stored a full snapshot instead",
            "!".yellow(),
            engine.patch().name()
        );
    }

    Ok(())
}
