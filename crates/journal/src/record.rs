//! Ledger data structures

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use quill_core::blob::blob_name;
use quill_core::BlobKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Snapshot cadence used when none is given
pub const DEFAULT_SNAPSHOT_INTERVAL: u32 = 5;

fn default_snapshot_interval() -> u32 {
    DEFAULT_SNAPSHOT_INTERVAL
}

/// Kind of document a repository tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// Office Open XML word-processor document (.docx)
    #[serde(rename = "docx", alias = "word-document")]
    WordDocument,
    /// Portable Document Format
    #[serde(rename = "pdf")]
    Pdf,
}

impl DocumentType {
    /// Whether plain-text diffs can be extracted from this type
    pub fn supports_text_diff(self) -> bool {
        matches!(self, DocumentType::WordDocument)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::WordDocument => f.write_str("word-document"),
            DocumentType::Pdf => f.write_str("pdf"),
        }
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "word-document" | "docx" => Ok(DocumentType::WordDocument),
            "pdf" => Ok(DocumentType::Pdf),
            other => Err(format!(
                "unknown document type '{}' (expected word-document or pdf)",
                other
            )),
        }
    }
}

/// One committed revision of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Version number, starting at 1 with no gaps
    pub version: u32,
    /// Whether the blob is a full snapshot or a delta
    pub kind: BlobKind,
    /// File name of the stored blob
    #[serde(alias = "file")]
    pub blob_ref: String,
    /// Commit message
    pub message: String,
    /// Creation time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    /// For deltas, the version the delta applies to. Kept for history
    /// display only; reconstruction relies on record order and kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_version: Option<u32>,
    /// BLAKE3 hex digest of the full document bytes at this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl VersionRecord {
    /// Record for a full snapshot
    pub fn snapshot(version: u32, message: impl Into<String>, checksum: String) -> Self {
        Self {
            version,
            kind: BlobKind::Snapshot,
            blob_ref: blob_name(version, BlobKind::Snapshot),
            message: message.into(),
            created_at: Utc::now(),
            base_version: None,
            checksum: Some(checksum),
        }
    }

    /// Record for a delta against `version - 1`
    pub fn delta(version: u32, message: impl Into<String>, checksum: String) -> Self {
        Self {
            version,
            kind: BlobKind::Delta,
            blob_ref: blob_name(version, BlobKind::Delta),
            message: message.into(),
            created_at: Utc::now(),
            base_version: Some(version - 1),
            checksum: Some(checksum),
        }
    }

    pub fn is_snapshot(&self) -> bool {
        self.kind == BlobKind::Snapshot
    }
}

/// RFC 3339, or an ISO timestamp without an offset read as UTC
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

/// The ledger of one tracked document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub document_type: DocumentType,
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval: u32,
    pub versions: Vec<VersionRecord>,
}

impl Repository {
    /// Start a ledger from its first record
    pub fn new(document_type: DocumentType, snapshot_interval: u32, first: VersionRecord) -> Self {
        Self {
            document_type,
            snapshot_interval,
            versions: vec![first],
        }
    }

    /// Highest committed version (0 for an empty ledger)
    pub fn latest_version(&self) -> u32 {
        self.versions.last().map(|r| r.version).unwrap_or(0)
    }

    /// Version the next commit will receive
    pub fn next_version(&self) -> u32 {
        self.latest_version() + 1
    }

    /// Whether `version` falls on the snapshot cadence
    ///
    /// The cadence is anchored to absolute version numbers. A fallback
    /// snapshot stored off-cadence does not move the schedule.
    pub fn snapshot_due(&self, version: u32) -> bool {
        version > 0 && self.snapshot_interval > 0 && (version - 1) % self.snapshot_interval == 0
    }

    /// Number of snapshot records
    pub fn snapshot_count(&self) -> usize {
        self.versions.iter().filter(|r| r.is_snapshot()).count()
    }

    /// Append the next record
    pub(crate) fn push(&mut self, record: VersionRecord) {
        debug_assert_eq!(record.version, self.next_version());
        self.versions.push(record);
    }

    /// Check the structural invariants a loaded ledger must satisfy
    ///
    /// Whether the first record is a snapshot is left to reconstruction,
    /// which reports it as a missing-snapshot invariant violation.
    pub fn check_structure(&self) -> std::result::Result<(), String> {
        if self.snapshot_interval == 0 {
            return Err("snapshot_interval must be positive".to_string());
        }
        if self.versions.is_empty() {
            return Err("ledger has no versions".to_string());
        }
        for (i, record) in self.versions.iter().enumerate() {
            let expected = i as u32 + 1;
            if record.version != expected {
                return Err(format!(
                    "record {} has version {}, expected {}",
                    i, record.version, expected
                ));
            }
            if record.blob_ref.is_empty() {
                return Err(format!("version {} has an empty blob reference", expected));
            }
        }
        Ok(())
    }
}
