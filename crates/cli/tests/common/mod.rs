//! Shared fixtures for CLI integration tests
//!
//! Every test gets its own directory and config file. The config selects
//! the built-in delta codec so the tests do not need `xdelta3` installed.

#![allow(dead_code)]

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Scratch workspace with an isolated Quill config
pub struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    /// Workspace using the built-in codec
    pub fn new() -> Result<Self> {
        Self::with_config("[patch]\nbackend = \"builtin\"\n")
    }

    pub fn with_config(config_toml: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let config = dir.path().join("config.toml");
        std::fs::write(&config, config_toml)?;
        Ok(Self { dir, config })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }

    /// Run `quill` in the workspace directory
    pub fn quill(&self, args: &[&str]) -> Result<Output> {
        Ok(Command::new(env!("CARGO_BIN_EXE_quill"))
            .args(args)
            .current_dir(self.dir.path())
            .env("QUILL_CONFIG", &self.config)
            .env_remove("RUST_LOG")
            .output()?)
    }

    /// Run `quill` and fail the test unless it succeeds
    pub fn quill_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.quill(args)?;
        assert!(
            output.status.success(),
            "quill {:?} failed with {:?}\nstdout: {}\nstderr: {}",
            args,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Deterministic binary content that looks like a PDF
pub fn pdf_bytes(seed: u64, len: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = b"%PDF-1.7\n".to_vec();
    data.extend((0..len).map(|_| rng.gen::<u8>()));
    data.extend_from_slice(b"\n%%EOF\n");
    data
}

/// Minimal `.docx` archive with one paragraph per entry
pub fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|text| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text))
        .collect();
    let xml = format!("<w:document><w:body>{}</w:body></w:document>", body);

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
