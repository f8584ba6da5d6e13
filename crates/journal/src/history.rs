//! History listing and text diffs between versions

use crate::docx;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::ledger::MetadataStore;
use crate::reconstruct::reconstruct_bytes;
use crate::record::{DocumentType, Repository};
use chrono::{DateTime, Utc};
use quill_core::{BlobKind, PatchService};
use std::path::Path;

/// One row of a repository's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub version: u32,
    pub kind: BlobKind,
    pub base_version: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Project the ledger into history rows, oldest first
pub fn history(repository: &Repository) -> Vec<HistoryEntry> {
    repository
        .versions
        .iter()
        .map(|r| HistoryEntry {
            version: r.version,
            kind: r.kind,
            base_version: r.base_version,
            created_at: r.created_at,
            message: r.message.clone(),
        })
        .collect()
}

/// Result of comparing the text of two versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextDiff {
    /// Text extraction is not available for this document type
    Unsupported(DocumentType),
    /// Both versions contain the same text
    Identical,
    /// Unified diff of the paragraph text
    Changed(String),
}

impl<P: PatchService, M: MetadataStore> Engine<P, M> {
    /// History of the tracked document
    pub fn history(&self, document: &Path) -> Result<Vec<HistoryEntry>> {
        let repository = self.load(document)?;
        Ok(history(&repository))
    }

    /// Line diff of the paragraph text of `v1` and `v2`
    pub fn text_diff(&self, document: &Path, v1: u32, v2: u32) -> Result<TextDiff> {
        let (layout, repository) = self.open(document)?;
        if !repository.document_type.supports_text_diff() {
            return Ok(TextDiff::Unsupported(repository.document_type));
        }

        let blobs = layout.blob_store();
        let old = paragraphs(&reconstruct_bytes(&blobs, &repository, &self.patch, v1)?, v1)?;
        let new = paragraphs(&reconstruct_bytes(&blobs, &repository, &self.patch, v2)?, v2)?;

        if old == new {
            return Ok(TextDiff::Identical);
        }

        Ok(TextDiff::Changed(unified_diff(&old, &new, v1, v2)))
    }
}

fn paragraphs(data: &[u8], version: u32) -> Result<Vec<String>> {
    docx::extract_paragraphs(data).map_err(|reason| EngineError::TextExtraction { version, reason })
}

fn unified_diff(old: &[String], new: &[String], v1: u32, v2: u32) -> String {
    let old_text = join_lines(old);
    let new_text = join_lines(new);

    let diff = similar::TextDiff::from_lines(&old_text, &new_text);
    diff.unified_diff()
        .context_radius(3)
        .header(&format!("v{}", v1), &format!("v{}", v2))
        .to_string()
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VersionRecord;

    #[test]
    fn test_history_projection() {
        let mut repo = Repository::new(
            DocumentType::Pdf,
            5,
            VersionRecord::snapshot(1, "Initial version", String::new()),
        );
        repo.push(VersionRecord::delta(2, "Second draft", String::new()));

        let entries = history(&repo);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, BlobKind::Snapshot);
        assert_eq!(entries[0].base_version, None);
        assert_eq!(entries[1].version, 2);
        assert_eq!(entries[1].base_version, Some(1));
        assert_eq!(entries[1].message, "Second draft");
    }

    #[test]
    fn test_unified_diff_headers_and_context() {
        let old: Vec<String> = ["Title", "Alpha", "Beta"].iter().map(|s| s.to_string()).collect();
        let new: Vec<String> = ["Title", "Alpha", "Gamma"].iter().map(|s| s.to_string()).collect();

        let diff = unified_diff(&old, &new, 1, 2);
        assert!(diff.starts_with("--- v1\n+++ v2\n"), "diff was:\n{}", diff);
        assert!(diff.contains("-Beta\n"));
        assert!(diff.contains("+Gamma\n"));
        assert!(diff.contains(" Alpha\n"));
    }

    #[test]
    fn test_join_lines() {
        assert_eq!(join_lines(&[]), "");
        assert_eq!(join_lines(&["a".to_string(), "b".to_string()]), "a\nb\n");
    }
}
