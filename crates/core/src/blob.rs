//! Version blob files: full snapshots and encoded deltas

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How a version's payload is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobKind {
    /// Full copy of the document bytes
    Snapshot,
    /// Encoded difference against the previous version
    Delta,
}

impl BlobKind {
    /// File suffix used for blobs of this kind
    pub fn suffix(self) -> &'static str {
        match self {
            BlobKind::Snapshot => "snapshot",
            BlobKind::Delta => "delta",
        }
    }
}

impl fmt::Display for BlobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Blob file name for a version, e.g. `v0012.delta`
pub fn blob_name(version: u32, kind: BlobKind) -> String {
    format!("v{:04}.{}", version, kind.suffix())
}

/// Flat directory of version blobs
///
/// Blobs live directly in the repository directory next to `metadata.json`.
/// Writes go through [`crate::store::atomic_write`] so a blob is either
/// absent or complete.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    tmp_dir: PathBuf,
}

impl BlobStore {
    /// Create a blob store rooted at `root`, staging writes in `tmp_dir`
    pub fn new(root: PathBuf, tmp_dir: PathBuf) -> Self {
        Self { root, tmp_dir }
    }

    /// Write a blob, returning the number of bytes stored
    ///
    /// A file with the same name can only exist if an earlier commit wrote
    /// its blob and then failed before the ledger was saved. Nothing refers
    /// to it, so it is replaced.
    pub fn write_blob(&self, name: &str, data: &[u8]) -> Result<u64> {
        let path = self.blob_path(name)?;
        if path.exists() {
            tracing::warn!("Replacing unreferenced blob {}", path.display());
        }

        crate::store::atomic_write(&self.tmp_dir, &path, data)
            .with_context(|| format!("Failed to write blob {}", name))?;

        Ok(data.len() as u64)
    }

    /// Read a blob's bytes
    pub fn read_blob(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.blob_path(name)?;
        if !path.exists() {
            anyhow::bail!("Blob not found: {}", name);
        }

        std::fs::read(&path).with_context(|| format!("Failed to read blob {}", path.display()))
    }

    /// Resolve a blob name, rejecting anything that is not a plain file name
    fn blob_path(&self, name: &str) -> Result<PathBuf> {
        let candidate = Path::new(name);
        let mut components = candidate.components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(_)), None) => Ok(self.root.join(candidate)),
            _ => anyhow::bail!("Invalid blob reference: {:?}", name),
        }
    }
}
