//! Commit engine: creates repositories and appends versions

use crate::error::{EngineError, Result};
use crate::ledger::{JsonMetadataStore, MetadataStore};
use crate::reconstruct::reconstruct_bytes;
use crate::record::{DocumentType, Repository, VersionRecord};
use anyhow::Context;
use quill_core::store::cleanup_tmp;
use quill_core::{hash_bytes, BlobKind, PatchService, RepoLayout};
use std::path::{Path, PathBuf};

/// Appended to the message of a snapshot stored because delta encoding failed
pub const FALLBACK_SUFFIX: &str = " (fallback snapshot)";

/// Result of `init`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A new repository was created with version 1
    Created { repo_dir: PathBuf, bytes: u64 },
    /// The document already had a repository; nothing was changed
    AlreadyInitialized { repo_dir: PathBuf, latest_version: u32 },
}

/// What `add` stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub version: u32,
    pub kind: BlobKind,
    /// True when a delta was attempted and a snapshot stored instead
    pub fallback: bool,
    /// Size of the blob written
    pub stored_bytes: u64,
    /// Size of the committed document
    pub document_bytes: u64,
}

/// Outcome of reconstructing every version of a repository
#[derive(Debug)]
pub struct VerifyReport {
    pub checked: u32,
    pub failures: Vec<(u32, EngineError)>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Version-control engine for single documents
///
/// The patch service and metadata store are supplied by the caller; the
/// engine holds no other state. Every operation reads the ledger from disk
/// and reconstructs from scratch.
pub struct Engine<P, M = JsonMetadataStore> {
    pub(crate) patch: P,
    pub(crate) metadata: M,
}

impl<P: PatchService> Engine<P, JsonMetadataStore> {
    /// Engine storing its ledger as `metadata.json`
    pub fn with_patch(patch: P) -> Self {
        Self::new(patch, JsonMetadataStore)
    }
}

impl<P: PatchService, M: MetadataStore> Engine<P, M> {
    pub fn new(patch: P, metadata: M) -> Self {
        Self { patch, metadata }
    }

    /// The patch service in use
    pub fn patch(&self) -> &P {
        &self.patch
    }

    /// Load the ledger for `document`, failing if there is none
    pub fn load(&self, document: &Path) -> Result<Repository> {
        self.open(document).map(|(_, repository)| repository)
    }

    pub(crate) fn open(&self, document: &Path) -> Result<(RepoLayout, Repository)> {
        let layout = RepoLayout::for_document(document)?;
        match self.metadata.load(&layout)? {
            Some(repository) => Ok((layout, repository)),
            None => Err(EngineError::NotInitialized(document.to_path_buf())),
        }
    }

    /// Start tracking `document`, storing its current bytes as version 1
    ///
    /// Safe to re-run: an existing repository is left untouched.
    pub fn init(
        &self,
        document: &Path,
        document_type: DocumentType,
        snapshot_interval: u32,
        message: &str,
    ) -> Result<InitOutcome> {
        if snapshot_interval == 0 {
            return Err(EngineError::InvalidSnapshotInterval(snapshot_interval));
        }

        let layout = RepoLayout::for_document(document)?;
        if let Some(existing) = self.metadata.load(&layout)? {
            tracing::info!("Repository already initialized at {}", layout.dir().display());
            return Ok(InitOutcome::AlreadyInitialized {
                repo_dir: layout.dir().to_path_buf(),
                latest_version: existing.latest_version(),
            });
        }

        let data = read_document(document)?;

        layout.create()?;
        cleanup_tmp(&layout)?;

        let record = VersionRecord::snapshot(1, message, hash_bytes(&data).to_hex());
        let bytes = layout.blob_store().write_blob(&record.blob_ref, &data)?;

        let repository = Repository::new(document_type, snapshot_interval, record);
        self.metadata.save(&repository, &layout)?;

        tracing::info!(
            "Initialized {} repository at {} ({} bytes)",
            document_type,
            layout.dir().display(),
            bytes
        );

        Ok(InitOutcome::Created {
            repo_dir: layout.dir().to_path_buf(),
            bytes,
        })
    }

    /// Record the document's current bytes as the next version
    pub fn add(&self, document: &Path, message: &str) -> Result<CommitSummary> {
        let (layout, mut repository) = self.open(document)?;
        cleanup_tmp(&layout)?;

        let data = read_document(document)?;
        let checksum = hash_bytes(&data).to_hex();
        let next = repository.next_version();
        let blobs = layout.blob_store();

        let (record, payload, fallback) = if repository.snapshot_due(next) {
            (VersionRecord::snapshot(next, message, checksum), None, false)
        } else {
            match self.encode_against_previous(&layout, &repository, next, &data) {
                Ok(delta) => (VersionRecord::delta(next, message, checksum), Some(delta), false),
                Err(EncodeFallback::Fatal(e)) => return Err(e),
                Err(EncodeFallback::Recoverable(reason)) => {
                    tracing::warn!(
                        "Delta for version {} not stored, keeping a full snapshot: {}",
                        next,
                        reason
                    );
                    let annotated = format!("{}{}", message, FALLBACK_SUFFIX);
                    (VersionRecord::snapshot(next, annotated, checksum), None, true)
                }
            }
        };

        // Blob first: a ledger entry must never point at a missing file
        let stored_bytes = blobs.write_blob(&record.blob_ref, payload.as_deref().unwrap_or(&data))?;

        let kind = record.kind;
        repository.push(record);
        self.metadata.save(&repository, &layout)?;

        tracing::info!("Added {} v{} ({} bytes stored)", kind, next, stored_bytes);

        Ok(CommitSummary {
            version: next,
            kind,
            fallback,
            stored_bytes,
            document_bytes: data.len() as u64,
        })
    }

    /// Encode `data` as a delta against the reconstructed previous version
    ///
    /// `Err` carries the reason a snapshot must be stored instead. Only
    /// failures of the patch tool are recoverable this way; a corrupt chain
    /// is still an error for the caller.
    fn encode_against_previous(
        &self,
        layout: &RepoLayout,
        repository: &Repository,
        next: u32,
        data: &[u8],
    ) -> std::result::Result<Vec<u8>, EncodeFallback> {
        let prior = match reconstruct_bytes(&layout.blob_store(), repository, &self.patch, next - 1) {
            Ok(prior) => prior,
            Err(EngineError::DecodeUnavailable { reason, .. }) => {
                return Err(EncodeFallback::Recoverable(reason))
            }
            Err(other) => return Err(EncodeFallback::Fatal(other)),
        };

        self.patch
            .encode(&prior, data)
            .map_err(|e| EncodeFallback::Recoverable(e.to_string()))
    }

    /// Reconstruct every version and collect the ones that fail
    pub fn verify(&self, document: &Path) -> Result<VerifyReport> {
        let (layout, repository) = self.open(document)?;
        let blobs = layout.blob_store();

        let mut report = VerifyReport {
            checked: 0,
            failures: Vec::new(),
        };

        for record in &repository.versions {
            if let Err(e) = reconstruct_bytes(&blobs, &repository, &self.patch, record.version) {
                tracing::warn!("Version {} failed verification: {}", record.version, e);
                report.failures.push((record.version, e));
            }
            report.checked += 1;
        }

        Ok(report)
    }
}

/// Why a delta could not be produced
enum EncodeFallback {
    /// The patch tool is missing or errored; store a snapshot
    Recoverable(String),
    /// The previous version cannot be rebuilt; abort the commit
    Fatal(EngineError),
}

fn read_document(document: &Path) -> Result<Vec<u8>> {
    let data = std::fs::read(document)
        .with_context(|| format!("Failed to read {}", document.display()))?;
    Ok(data)
}
