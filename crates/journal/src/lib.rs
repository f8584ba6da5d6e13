//! Version ledger and engine for per-document history
//!
//! This crate provides:
//! - Version records and the repository ledger model
//! - The metadata store that persists the ledger beside the blobs
//! - The commit engine (snapshot cadence, delta encoding, fallback)
//! - Reconstruction of any committed version from its snapshot chain
//! - History listing and plain-text diffs of word documents
//!
//! A repository assumes a single writer. Running `add` or `revert` against
//! the same document from two processes at once is not guarded against.

pub mod docx;
pub mod engine;
pub mod error;
pub mod history;
pub mod ledger;
pub mod reconstruct;
pub mod record;

// Re-exports
pub use engine::{CommitSummary, Engine, InitOutcome, VerifyReport, FALLBACK_SUFFIX};
pub use error::{EngineError, Result};
pub use history::{history, HistoryEntry, TextDiff};
pub use ledger::{JsonMetadataStore, MetadataStore};
pub use reconstruct::reconstruct_bytes;
pub use record::{DocumentType, Repository, VersionRecord, DEFAULT_SNAPSHOT_INTERVAL};
pub use quill_core::BlobKind;
