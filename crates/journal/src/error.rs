//! Engine error taxonomy

use std::path::PathBuf;

/// Errors surfaced by ledger, commit and reconstruction operations
///
/// Delta encoding failures never appear here: `add` recovers from them by
/// storing a snapshot. Decoding failures are always fatal for the version
/// being reconstructed and name it.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Repository not initialized for {}. Run `quill init` first.", .0.display())]
    NotInitialized(PathBuf),

    #[error("Version {requested} out of range: repository has versions 1..={latest}")]
    VersionOutOfRange { requested: i64, latest: u32 },

    #[error("Corrupt metadata at {}: {reason}", .path.display())]
    CorruptMetadata { path: PathBuf, reason: String },

    #[error("Ledger has no snapshot at or before version {0}")]
    MissingSnapshotInvariant(u32),

    #[error("Cannot reconstruct version {version}: patch tool unavailable ({reason})")]
    DecodeUnavailable { version: u32, reason: String },

    #[error("Cannot reconstruct version {version}: delta could not be applied ({reason})")]
    DecodeFailed { version: u32, reason: String },

    #[error("Version {version} does not match its checksum (expected {expected}, got {actual})")]
    ChecksumMismatch {
        version: u32,
        expected: String,
        actual: String,
    },

    #[error("Snapshot interval must be a positive integer, got {0}")]
    InvalidSnapshotInterval(u32),

    #[error("Cannot extract text from version {version}: {reason}")]
    TextExtraction { version: u32, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
