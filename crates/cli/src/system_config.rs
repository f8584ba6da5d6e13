//! System-wide configuration for Quill
//!
//! The config file lives at `~/.config/quill/config.toml` (Linux),
//! `~/Library/Application Support/quill/config.toml` (macOS) or
//! `%APPDATA%\quill\config.toml` (Windows). Set `QUILL_CONFIG` to use a
//! different file.

use anyhow::{Context, Result};
use quill_core::{PatchService, Splice, Unavailable, Xdelta3};
use quill_journal::DEFAULT_SNAPSHOT_INTERVAL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "QUILL_CONFIG";

/// System-wide Quill configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Commit engine defaults
    pub engine: EngineConfig,

    /// Delta backend selection
    pub patch: PatchConfig,

    /// Logging
    pub log: LogConfig,
}

/// Commit engine defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Snapshot interval for new repositories (default: 5)
    pub default_snapshot_interval: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }
}

/// Which tool encodes and decodes deltas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchBackend {
    /// External `xdelta3` executable
    #[default]
    Xdelta3,
    /// Built-in prefix/suffix codec
    Builtin,
    /// No delta support: every commit is a snapshot
    None,
}

/// Delta backend configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    pub backend: PatchBackend,

    /// Path to the `xdelta3` executable (default: looked up on `PATH`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xdelta3_path: Option<PathBuf>,
}

impl PatchConfig {
    /// Build the configured patch service
    pub fn service(&self) -> Box<dyn PatchService> {
        match self.backend {
            PatchBackend::Xdelta3 => match &self.xdelta3_path {
                Some(path) => Box::new(Xdelta3::with_program(path)),
                None => Box::new(Xdelta3::new()),
            },
            PatchBackend::Builtin => Box::new(Splice),
            PatchBackend::None => Box::new(Unavailable::new("patch backend disabled in config")),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set (default: "warn")
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Get the system config file path
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|d| d.join("quill").join("config.toml"))
}

/// Load system configuration
///
/// Returns default config if file doesn't exist.
pub fn load() -> Result<SystemConfig> {
    let config_path = match config_file_path() {
        Some(p) => p,
        None => {
            tracing::debug!("Could not determine config directory, using defaults");
            return Ok(SystemConfig::default());
        }
    };

    if !config_path.exists() {
        tracing::debug!("System config not found at {}, using defaults", config_path.display());
        return Ok(SystemConfig::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read system config at {}", config_path.display()))?;

    let config: SystemConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse system config at {}", config_path.display()))?;

    tracing::debug!("Loaded system config from {}", config_path.display());
    Ok(config)
}

/// Save system configuration
pub fn save(config: &SystemConfig) -> Result<PathBuf> {
    let config_path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine system config directory"))?;

    if let Some(config_dir) = config_path.parent() {
        fs::create_dir_all(config_dir).with_context(|| {
            format!("Failed to create config directory at {}", config_dir.display())
        })?;
    }

    let content = toml::to_string_pretty(config).context("Failed to serialize system config")?;

    fs::write(&config_path, &content)
        .with_context(|| format!("Failed to write system config to {}", config_path.display()))?;

    tracing::info!("Saved system config to {}", config_path.display());
    Ok(config_path)
}

/// Write the default config if no config file exists yet
///
/// Returns the path written, or `None` when a file was already there.
pub fn init_if_missing() -> Result<Option<PathBuf>> {
    match config_file_path() {
        Some(path) if path.exists() => Ok(None),
        _ => save(&SystemConfig::default()).map(Some),
    }
}

/// Generate example config content for display
pub fn example_config() -> String {
    let config = SystemConfig::default();
    let mut content = String::from("# Quill System Configuration\n");
    content.push_str("# Location: ~/.config/quill/config.toml (override with QUILL_CONFIG)\n");
    content.push_str("#\n");
    content.push_str("# [patch] backend is one of \"xdelta3\", \"builtin\" or \"none\".\n");
    content.push_str("# RUST_LOG takes precedence over [log] level.\n\n");

    content.push_str(&toml::to_string_pretty(&config).unwrap_or_default());
    content
}
