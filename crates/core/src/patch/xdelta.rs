//! Patch service backed by the external `xdelta3` tool

use super::{PatchError, PatchService};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Runs `xdelta3` in a scratch directory per call
///
/// Inputs are written to a fresh temporary directory right before the
/// process starts. The directory is removed when the call returns, whether
/// the tool succeeded, failed, or the thread unwinds.
#[derive(Debug, Clone)]
pub struct Xdelta3 {
    program: PathBuf,
    scratch_root: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Encode,
    Decode,
}

impl Mode {
    fn flag(self) -> &'static str {
        match self {
            Mode::Encode => "-e",
            Mode::Decode => "-d",
        }
    }

    fn unavailable(self, reason: String) -> PatchError {
        match self {
            Mode::Encode => PatchError::EncodeUnavailable(reason),
            Mode::Decode => PatchError::DecodeUnavailable(reason),
        }
    }

    fn failed(self, reason: String) -> PatchError {
        match self {
            Mode::Encode => PatchError::EncodeFailed(reason),
            Mode::Decode => PatchError::DecodeFailed(reason),
        }
    }
}

impl Default for Xdelta3 {
    fn default() -> Self {
        Self::new()
    }
}

impl Xdelta3 {
    /// Use `xdelta3` from `PATH`
    pub fn new() -> Self {
        Self::with_program("xdelta3")
    }

    /// Use a specific executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir
    pub fn scratch_in(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    fn run(&self, mode: Mode, source: &[u8], input: &[u8]) -> Result<Vec<u8>, PatchError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("quill-xdelta-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| mode.unavailable(format!("cannot create scratch directory: {}", e)))?;

        let source_path = scratch.path().join("source");
        let input_path = scratch.path().join("input");
        let output_path = scratch.path().join("output");

        std::fs::write(&source_path, source)
            .and_then(|_| std::fs::write(&input_path, input))
            .map_err(|e| mode.unavailable(format!("cannot stage inputs: {}", e)))?;

        tracing::debug!(
            "Running {} {} on {} + {} bytes",
            self.program.display(),
            mode.flag(),
            source.len(),
            input.len()
        );

        let output = Command::new(&self.program)
            .arg(mode.flag())
            .arg("-f")
            .arg("-s")
            .arg(&source_path)
            .arg(&input_path)
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                mode.unavailable(format!("cannot run {}: {}", self.program.display(), e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(mode.failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        std::fs::read(&output_path)
            .map_err(|e| mode.failed(format!("cannot read tool output: {}", e)))
    }
}

impl PatchService for Xdelta3 {
    fn name(&self) -> &str {
        "xdelta3"
    }

    fn encode(&self, base: &[u8], target: &[u8]) -> Result<Vec<u8>, PatchError> {
        self.run(Mode::Encode, base, target)
    }

    fn decode(&self, base: &[u8], delta: &[u8]) -> Result<Vec<u8>, PatchError> {
        self.run(Mode::Decode, base, delta)
    }
}
