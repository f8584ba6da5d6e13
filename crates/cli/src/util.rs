//! Shared utilities for CLI commands

use chrono::{DateTime, Utc};
use quill_journal::EngineError;

/// Exit status for arguments the command line parser rejects
pub const USAGE_EXIT_CODE: u8 = 64;

/// Exit status for a failed command
///
/// 2 when the document has no repository, 3 when a version number is out
/// of range, 1 for everything else.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let engine_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<EngineError>());

    match engine_error {
        Some(EngineError::NotInitialized(_)) => 2,
        Some(EngineError::VersionOutOfRange { .. }) => 3,
        _ => 1,
    }
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(ts);
    match u64::try_from(elapsed.num_seconds()) {
        Ok(secs) if secs < 5 => "just now".to_string(),
        Ok(secs) => format!("{} ago", format_duration(secs)),
        Err(_) => "in the future".to_string(),
    }
}

/// Format timestamp as absolute time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format duration in user-friendly format
/// Shows the most significant unit without being overly granular
pub fn format_duration(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;
    const WEEK: u64 = DAY * 7;
    const MONTH: u64 = DAY * 30;
    const YEAR: u64 = DAY * 365;

    let (count, unit) = if secs < MINUTE {
        (secs, "second")
    } else if secs < HOUR {
        (secs / MINUTE, "minute")
    } else if secs < DAY {
        (secs / HOUR, "hour")
    } else if secs < WEEK {
        (secs / DAY, "day")
    } else if secs < MONTH {
        (secs / WEEK, "week")
    } else if secs < YEAR {
        (secs / MONTH, "month")
    } else {
        (secs / YEAR, "year")
    };

    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
