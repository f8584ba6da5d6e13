//! Rebuilding document bytes from the snapshot chain

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::ledger::MetadataStore;
use crate::record::Repository;
use quill_core::store::atomic_write;
use quill_core::{hash_bytes, BlobKind, BlobStore, PatchError, PatchService};
use std::path::Path;

/// Reconstruct the bytes of `target` from `repository`
///
/// Walks back to the nearest snapshot at or before `target`, then replays
/// every later record in order: a snapshot replaces the working buffer and
/// a delta is decoded against it. Decode errors are fatal and name the
/// version whose delta failed.
pub fn reconstruct_bytes<P: PatchService + ?Sized>(
    blobs: &BlobStore,
    repository: &Repository,
    patch: &P,
    target: u32,
) -> Result<Vec<u8>> {
    let latest = repository.latest_version();
    if target < 1 || target > latest {
        return Err(EngineError::VersionOutOfRange {
            requested: i64::from(target),
            latest,
        });
    }

    let chain = &repository.versions[..target as usize];
    let start = chain
        .iter()
        .rposition(|r| r.is_snapshot())
        .ok_or(EngineError::MissingSnapshotInvariant(target))?;

    let base = &chain[start];
    tracing::debug!("Reconstructing v{} from snapshot v{}", target, base.version);
    let mut working = blobs.read_blob(&base.blob_ref)?;

    for record in &chain[start + 1..] {
        let payload = blobs.read_blob(&record.blob_ref)?;
        working = match record.kind {
            BlobKind::Snapshot => payload,
            BlobKind::Delta => {
                tracing::debug!("Applying delta v{} ({} bytes)", record.version, payload.len());
                patch
                    .decode(&working, &payload)
                    .map_err(|e| decode_error(record.version, e))?
            }
        };
    }

    if let Some(expected) = &chain[chain.len() - 1].checksum {
        let actual = hash_bytes(&working).to_hex();
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(EngineError::ChecksumMismatch {
                version: target,
                expected: expected.clone(),
                actual,
            });
        }
    }

    Ok(working)
}

fn decode_error(version: u32, error: PatchError) -> EngineError {
    match error {
        PatchError::DecodeUnavailable(reason) | PatchError::EncodeUnavailable(reason) => {
            EngineError::DecodeUnavailable { version, reason }
        }
        PatchError::DecodeFailed(reason) | PatchError::EncodeFailed(reason) => {
            EngineError::DecodeFailed { version, reason }
        }
    }
}

impl<P: PatchService, M: MetadataStore> Engine<P, M> {
    /// Bytes of `version` of the tracked document
    pub fn reconstruct_bytes(&self, document: &Path, version: u32) -> Result<Vec<u8>> {
        let (layout, repository) = self.open(document)?;
        reconstruct_bytes(&layout.blob_store(), &repository, &self.patch, version)
    }

    /// Write `version` to `output` without touching the repository
    ///
    /// Nothing is written if reconstruction fails.
    pub fn get(&self, document: &Path, version: u32, output: &Path) -> Result<u64> {
        let data = self.reconstruct_bytes(document, version)?;
        write_over(output, &data)?;

        tracing::info!("Wrote v{} to {} ({} bytes)", version, output.display(), data.len());
        Ok(data.len() as u64)
    }

    /// Replace the tracked document with `version`
    ///
    /// The ledger is unchanged; the restored content becomes a new version
    /// only when it is added.
    pub fn revert(&self, document: &Path, version: u32) -> Result<u64> {
        let data = self.reconstruct_bytes(document, version)?;
        write_over(document, &data)?;

        tracing::info!("Reverted {} to v{}", document.display(), version);
        Ok(data.len() as u64)
    }
}

/// Atomically replace `target`, or the file it links to
fn write_over(target: &Path, data: &[u8]) -> Result<()> {
    let target = match std::fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => std::fs::canonicalize(target)?,
        _ => target.to_path_buf(),
    };
    atomic_write(&staging_dir(&target), &target, data)?;
    Ok(())
}

/// Directory a temporary file for `target` is staged in
///
/// Staging beside the target keeps the final rename on one filesystem.
fn staging_dir(target: &Path) -> std::path::PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DocumentType, VersionRecord};
    use quill_core::Splice;

    fn store_in(dir: &Path) -> BlobStore {
        BlobStore::new(dir.to_path_buf(), dir.join("tmp"))
    }

    fn checksum(data: &[u8]) -> String {
        hash_bytes(data).to_hex()
    }

    /// Ledger over `contents`, snapshots where `snapshots[i]` is set
    fn build(dir: &Path, contents: &[&str], snapshots: &[bool]) -> Repository {
        let blobs = store_in(dir);
        let first = VersionRecord::snapshot(1, "Initial version", checksum(contents[0].as_bytes()));
        blobs.write_blob(&first.blob_ref, contents[0].as_bytes()).unwrap();
        let mut repo = Repository::new(DocumentType::Pdf, 100, first);

        for (i, text) in contents.iter().enumerate().skip(1) {
            let version = i as u32 + 1;
            let data = text.as_bytes();
            let record = if snapshots[i] {
                blobs.write_blob(&format!("v{:04}.snapshot", version), data).unwrap();
                VersionRecord::snapshot(version, "Update", checksum(data))
            } else {
                let delta = Splice.encode(contents[i - 1].as_bytes(), data).unwrap();
                blobs.write_blob(&format!("v{:04}.delta", version), &delta).unwrap();
                VersionRecord::delta(version, "Update", checksum(data))
            };
            repo.push(record);
        }
        repo
    }

    #[test]
    fn test_replays_across_snapshots() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let contents = ["one", "one two", "three", "three four", "three five"];
        let repo = build(temp_dir.path(), &contents, &[true, false, true, false, false]);
        let blobs = store_in(temp_dir.path());

        for (i, expected) in contents.iter().enumerate() {
            let got = reconstruct_bytes(&blobs, &repo, &Splice, i as u32 + 1)?;
            assert_eq!(got, expected.as_bytes(), "version {}", i + 1);
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let repo = build(temp_dir.path(), &["a", "b"], &[true, false]);
        let blobs = store_in(temp_dir.path());

        for target in [0, 3, 999] {
            match reconstruct_bytes(&blobs, &repo, &Splice, target) {
                Err(EngineError::VersionOutOfRange { requested, latest }) => {
                    assert_eq!(requested, i64::from(target));
                    assert_eq!(latest, 2);
                }
                other => panic!("expected out of range for {}, got {:?}", target, other),
            }
        }
        Ok(())
    }

    #[test]
    fn test_base_version_is_not_consulted() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut repo = build(temp_dir.path(), &["AAA", "AAB", "AAC"], &[true, false, false]);
        repo.versions[2].base_version = Some(1);
        repo.versions[1].base_version = None;

        let got = reconstruct_bytes(&store_in(temp_dir.path()), &repo, &Splice, 3)?;
        assert_eq!(got, b"AAC");
        Ok(())
    }

    #[test]
    fn test_missing_snapshot_invariant() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut repo = build(temp_dir.path(), &["AAA", "AAB"], &[true, false]);
        repo.versions[0].kind = BlobKind::Delta;

        let err = reconstruct_bytes(&store_in(temp_dir.path()), &repo, &Splice, 2).unwrap_err();
        assert!(matches!(err, EngineError::MissingSnapshotInvariant(2)));
        Ok(())
    }

    #[test]
    fn test_checksum_mismatch() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut repo = build(temp_dir.path(), &["AAA", "AAB"], &[true, false]);
        repo.versions[1].checksum = Some(checksum(b"something else"));

        let blobs = store_in(temp_dir.path());
        let err = reconstruct_bytes(&blobs, &repo, &Splice, 2).unwrap_err();
        assert!(matches!(err, EngineError::ChecksumMismatch { version: 2, .. }));

        // Earlier versions are unaffected
        assert_eq!(reconstruct_bytes(&blobs, &repo, &Splice, 1)?, b"AAA");
        Ok(())
    }

    #[test]
    fn test_decode_errors_name_the_version() -> anyhow::Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let repo = build(
            temp_dir.path(),
            &["AAA", "AAB", "AAC"],
            &[true, false, false],
        );
        let blobs = store_in(temp_dir.path());

        let unavailable = quill_core::Unavailable::new("no patch tool configured");
        let err = reconstruct_bytes(&blobs, &repo, &unavailable, 3).unwrap_err();
        assert!(matches!(err, EngineError::DecodeUnavailable { version: 2, .. }));

        // A corrupted delta blob fails to decode
        blobs.write_blob("v0003.delta", b"garbage")?;
        let err = reconstruct_bytes(&blobs, &repo, &Splice, 3).unwrap_err();
        assert!(matches!(err, EngineError::DecodeFailed { version: 3, .. }));
        Ok(())
    }

    #[test]
    fn test_staging_dir() {
        assert_eq!(staging_dir(Path::new("out.bin")), Path::new("."));
        assert_eq!(staging_dir(Path::new("/tmp/x/out.bin")), Path::new("/tmp/x"));
    }
}
