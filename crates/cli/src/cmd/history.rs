//! Display the version history of a document

use super::CliEngine;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use quill_journal::{BlobKind, HistoryEntry};
use std::path::Path;

pub fn run(engine: &CliEngine, document: &Path) -> Result<()> {
    let entries = engine.history(document)?;

    println!("{} {}", "History of".bold(), document.display());
    println!();

    for entry in entries.iter().rev() {
        display_entry(entry);
    }

    println!();
    println!("{} versions", entries.len());
    Ok(())
}

fn display_entry(entry: &HistoryEntry) {
    let version = format!("v{}", entry.version);
    let kind = match entry.kind {
        BlobKind::Snapshot => "snapshot".cyan().to_string(),
        BlobKind::Delta => match entry.base_version {
            Some(base) => format!("{} of v{}", "delta".dimmed(), base),
            None => "delta".dimmed().to_string(),
        },
    };

    println!(
        "{:>6}  {}  {}  {}",
        version.yellow(),
        util::format_absolute_time(entry.created_at),
        entry.message,
        format!("({}, {})", kind, util::format_relative_time(entry.created_at)).dimmed()
    );
}
