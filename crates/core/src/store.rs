//! On-disk repository layout for a tracked document

use crate::blob::BlobStore;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the ledger file inside a repository directory
pub const METADATA_FILE: &str = "metadata.json";

/// Locations of everything Quill stores for one document
///
/// The repository lives beside the document it tracks:
/// ```text
/// report.docx
/// .report.docx.repo/
///   metadata.json
///   v0001.snapshot
///   v0002.delta
///   ...
///   tmp/
/// ```
#[derive(Debug, Clone)]
pub struct RepoLayout {
    /// Sibling repository directory
    dir: PathBuf,
}

impl RepoLayout {
    /// Derive the repository location from the document path
    pub fn for_document(document: &Path) -> Result<Self> {
        let name = document
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Not a file path: {}", document.display()))?;

        let mut repo_name = std::ffi::OsString::from(".");
        repo_name.push(name);
        repo_name.push(".repo");

        Ok(Self {
            dir: document.with_file_name(repo_name),
        })
    }

    /// Create the repository directory and its staging area
    pub fn create(&self) -> Result<()> {
        std::fs::create_dir_all(self.tmp_dir())
            .with_context(|| format!("Failed to create repository at {}", self.dir.display()))
    }

    /// The repository directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the ledger file
    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Staging directory for atomic writes
    pub fn tmp_dir(&self) -> PathBuf {
        self.dir.join("tmp")
    }

    /// Blob store for this repository
    pub fn blob_store(&self) -> BlobStore {
        BlobStore::new(self.dir.clone(), self.tmp_dir())
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file in `tmp_dir`, fsyncs it, then renames it
/// over `target`. The temporary file is removed if any step fails, and a
/// reader of `target` sees either the old or the new contents. An existing
/// target keeps its permissions.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    std::fs::create_dir_all(tmp_dir)
        .with_context(|| format!("Failed to create {}", tmp_dir.display()))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(tmp_dir)?;
    temp_file.write_all(data)?;
    if let Ok(existing) = std::fs::metadata(target) {
        temp_file
            .as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", target.display()))?;
    }
    temp_file.as_file().sync_all()?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    temp_file
        .persist(target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", target.display()))?;

    // Fsync parent directory for durability
    if let Some(parent) = target.parent() {
        if let Ok(dir) = std::fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

/// Remove staging files left behind by an interrupted process
///
/// Returns the number of entries removed.
pub fn cleanup_tmp(layout: &RepoLayout) -> Result<usize> {
    let tmp_dir = layout.tmp_dir();
    if !tmp_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(&tmp_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
        tracing::warn!("Removed incomplete write: {}", path.display());
        removed += 1;
    }

    Ok(removed)
}
