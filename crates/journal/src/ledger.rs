//! Persistence of the version ledger

use crate::error::{EngineError, Result};
use crate::record::Repository;
use anyhow::Context;
use quill_core::store::atomic_write;
use quill_core::RepoLayout;

/// Loads and saves a repository's ledger
///
/// The stored ledger is the single source of truth. Implementations must
/// not cache it between calls.
pub trait MetadataStore {
    /// Load the ledger, or `None` when the repository has none yet
    fn load(&self, layout: &RepoLayout) -> Result<Option<Repository>>;

    /// Replace the stored ledger with `repository`
    fn save(&self, repository: &Repository, layout: &RepoLayout) -> Result<()>;
}

/// Ledger stored as pretty-printed `metadata.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMetadataStore;

impl MetadataStore for JsonMetadataStore {
    fn load(&self, layout: &RepoLayout) -> Result<Option<Repository>> {
        let path = layout.metadata_path();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;

        let repository: Repository =
            serde_json::from_str(&content).map_err(|e| EngineError::CorruptMetadata {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        repository
            .check_structure()
            .map_err(|reason| EngineError::CorruptMetadata {
                path: path.clone(),
                reason,
            })?;

        tracing::debug!(
            "Loaded ledger {} ({} versions)",
            path.display(),
            repository.versions.len()
        );
        Ok(Some(repository))
    }

    fn save(&self, repository: &Repository, layout: &RepoLayout) -> Result<()> {
        let path = layout.metadata_path();
        let content =
            serde_json::to_vec_pretty(repository).context("Failed to serialize ledger")?;

        atomic_write(&layout.tmp_dir(), &path, &content)?;

        tracing::debug!("Saved ledger {}", path.display());
        Ok(())
    }
}
