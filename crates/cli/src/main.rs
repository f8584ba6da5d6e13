//! Quill CLI - quill command

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use quill_cli::cmd::{self, CliEngine};
use quill_cli::system_config::{self, SystemConfig};
use quill_cli::util;
use quill_core::PatchService;
use quill_journal::{DocumentType, Engine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Quill - Version history for individual documents
#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start tracking a document
    Init {
        /// Document to track
        file: PathBuf,
        /// Document type (word-document or pdf)
        #[arg(long = "type", value_name = "TYPE")]
        document_type: DocumentType,
        /// Message for version 1
        #[arg(short, long, default_value = "Initial version")]
        message: String,
        /// Store a full snapshot every N versions (default: from config)
        #[arg(long)]
        interval: Option<u32>,
    },
    /// Record the document's current contents as a new version
    Add {
        /// Tracked document
        file: PathBuf,
        /// Expected document type; a mismatch is reported and ignored
        #[arg(long = "type", value_name = "TYPE")]
        document_type: Option<DocumentType>,
        /// Commit message
        #[arg(short, long, default_value = "Update")]
        message: String,
    },
    /// Show the version history
    History {
        /// Tracked document
        file: PathBuf,
    },
    /// Write a past version to another file
    Get {
        /// Tracked document
        file: PathBuf,
        /// Version number
        #[arg(allow_negative_numbers = true)]
        version: i64,
        /// Destination file
        output: PathBuf,
    },
    /// Replace the document with a past version
    Revert {
        /// Tracked document
        file: PathBuf,
        /// Version number
        #[arg(allow_negative_numbers = true)]
        version: i64,
    },
    /// Show text changes between two versions (word documents only)
    ShowDiff {
        /// Tracked document
        file: PathBuf,
        /// Older version
        #[arg(allow_negative_numbers = true)]
        v1: i64,
        /// Newer version
        #[arg(allow_negative_numbers = true)]
        v2: i64,
    },
    /// Reconstruct every version and check its checksum
    Verify {
        /// Tracked document
        file: PathBuf,
    },
    /// Show the system configuration
    Config {
        /// Print the config file location
        #[arg(long, conflicts_with_all = ["example", "init"])]
        path: bool,
        /// Print an annotated example config
        #[arg(long, conflicts_with = "init")]
        example: bool,
        /// Write the default config if none exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(util::USAGE_EXIT_CODE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            ExitCode::from(util::exit_code(&err))
        }
    }
}

fn execute(command: Commands) -> Result<()> {
    // Locating and explaining the config must work while it is broken
    match &command {
        Commands::Config { path: true, .. } => {
            init_tracing("warn");
            return cmd::config::print_path();
        }
        Commands::Config { example: true, .. } => {
            init_tracing("warn");
            cmd::config::print_example();
            return Ok(());
        }
        _ => {}
    }

    let config = system_config::load();
    let level = match &config {
        Ok(config) => config.log.level.as_str(),
        Err(_) => "warn",
    };
    init_tracing(level);

    run(command, &config?)
}

/// Log to stderr, filtered by `RUST_LOG` or else the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands, config: &SystemConfig) -> Result<()> {
    let engine: CliEngine = Engine::with_patch(config.patch.service());
    tracing::debug!("Using patch backend {}", engine.patch().name());

    match command {
        Commands::Init {
            file,
            document_type,
            message,
            interval,
        } => {
            let interval = interval.unwrap_or(config.engine.default_snapshot_interval);
            cmd::init::run(&engine, &file, document_type, interval, &message)
        }
        Commands::Add {
            file,
            document_type,
            message,
        } => cmd::add::run(&engine, &file, document_type, &message),
        Commands::History { file } => cmd::history::run(&engine, &file),
        Commands::Get {
            file,
            version,
            output,
        } => cmd::get::run(&engine, &file, version, &output),
        Commands::Revert { file, version } => cmd::revert::run(&engine, &file, version),
        Commands::ShowDiff { file, v1, v2 } => cmd::show_diff::run(&engine, &file, v1, v2),
        Commands::Verify { file } => cmd::verify::run(&engine, &file),
        Commands::Config { init, .. } => cmd::config::run(config, init),
    }
}
