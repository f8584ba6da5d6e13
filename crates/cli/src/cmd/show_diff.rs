//! Show the text changes between two versions

use super::CliEngine;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use quill_journal::TextDiff;
use std::path::Path;

pub fn run(engine: &CliEngine, document: &Path, v1: i64, v2: i64) -> Result<()> {
    let v1 = super::version_number(engine, document, v1)?;
    let v2 = super::version_number(engine, document, v2)?;
    let diff = engine
        .text_diff(document, v1, v2)
        .with_context(|| format!("Failed to diff versions {} and {}", v1, v2))?;

    match diff {
        TextDiff::Unsupported(document_type) => {
            println!(
                "{} Text diff is not supported for {} documents",
                "!".yellow(),
                document_type
            );
        }
        TextDiff::Identical => {
            println!("No text changes between v{} and v{}", v1, v2);
        }
        TextDiff::Changed(text) => {
            for line in text.lines() {
                print_line(line);
            }
        }
    }

    Ok(())
}

fn print_line(line: &str) {
    if line.starts_with("+++") || line.starts_with("---") {
        println!("{}", line.bold());
    } else if line.starts_with("@@") {
        println!("{}", line.cyan());
    } else if line.starts_with('+') {
        println!("{}", line.green());
    } else if line.starts_with('-') {
        println!("{}", line.red());
    } else {
        println!("{}", line);
    }
}
