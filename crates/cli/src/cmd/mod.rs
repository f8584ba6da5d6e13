//! CLI command implementations

use anyhow::Result;
use quill_core::PatchService;
use quill_journal::{Engine, EngineError};
use std::path::Path;

pub mod add;
pub mod config;
pub mod get;
pub mod history;
pub mod init;
pub mod revert;
pub mod show_diff;
pub mod verify;

/// Engine driven by the patch backend chosen in the system config
pub type CliEngine = Engine<Box<dyn PatchService>>;

/// Check a version number given on the command line against the ledger
///
/// Numbers no version can have, such as negatives, are out of range
/// rather than usage errors.
pub fn version_number(engine: &CliEngine, document: &Path, requested: i64) -> Result<u32> {
    let latest = engine.load(document)?.latest_version();
    u32::try_from(requested)
        .ok()
        .filter(|v| (1..=latest).contains(v))
        .ok_or_else(|| EngineError::VersionOutOfRange { requested, latest }.into())
}
