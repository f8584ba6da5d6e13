//! Quill Core - Storage primitives for per-document version history
//!
//! This crate provides the foundational storage layer:
//! - BLAKE3 content checksums
//! - Version blob files (snapshots and deltas)
//! - Repository layout and atomic writes
//! - The patch service used to encode and decode binary deltas

pub mod hash;
pub mod blob;
pub mod store;
pub mod patch;

// Re-export main types for convenience
pub use hash::{hash_bytes, Blake3Hash};
pub use blob::{BlobKind, BlobStore};
pub use patch::{PatchError, PatchService, Splice, Unavailable, Xdelta3};
pub use store::{atomic_write, RepoLayout};

/// Common result type used throughout quill-core
pub type Result<T> = anyhow::Result<T>;
