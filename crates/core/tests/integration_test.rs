//! Integration tests for quill-core storage primitives

use quill_core::blob::blob_name;
use quill_core::{hash_bytes, BlobKind, PatchService, RepoLayout, Splice};

#[test]
fn test_snapshot_and_delta_blobs_rebuild_document() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let document = temp_dir.path().join("contract.pdf");
    let layout = RepoLayout::for_document(&document)?;
    layout.create()?;
    let blobs = layout.blob_store();

    let v1 = b"%PDF-1.7\n1 0 obj << /Title (Draft) >>\n%%EOF".to_vec();
    let v2 = b"%PDF-1.7\n1 0 obj << /Title (Final) >>\n%%EOF".to_vec();

    blobs.write_blob(&blob_name(1, BlobKind::Snapshot), &v1)?;
    let delta = Splice.encode(&v1, &v2)?;
    blobs.write_blob(&blob_name(2, BlobKind::Delta), &delta)?;

    assert!(delta.len() < v2.len());

    let base = blobs.read_blob("v0001.snapshot")?;
    let stored_delta = blobs.read_blob("v0002.delta")?;
    let rebuilt = Splice.decode(&base, &stored_delta)?;

    assert_eq!(rebuilt, v2);
    assert_eq!(hash_bytes(&rebuilt), hash_bytes(&v2));

    // Blobs sit directly in the repository directory
    assert!(layout.dir().join("v0001.snapshot").is_file());
    assert!(layout.dir().join("v0002.delta").is_file());

    Ok(())
}

#[test]
fn test_layout_persists_across_reopen() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let document = temp_dir.path().join("notes.docx");

    {
        let layout = RepoLayout::for_document(&document)?;
        layout.create()?;
        layout.blob_store().write_blob("v0001.snapshot", b"PK\x03\x04")?;
    }

    let reopened = RepoLayout::for_document(&document)?;
    assert_eq!(reopened.dir(), temp_dir.path().join(".notes.docx.repo"));
    assert_eq!(reopened.blob_store().read_blob("v0001.snapshot")?, b"PK\x03\x04");

    Ok(())
}
