//! Inspect or create the system config

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Print where the config file is read from
pub fn print_path() -> Result<()> {
    match system_config::config_file_path() {
        Some(p) => println!("{}", p.display()),
        None => anyhow::bail!("Could not determine system config directory"),
    }
    Ok(())
}

pub fn print_example() {
    print!("{}", system_config::example_config());
}

/// Show the effective config, or write the defaults with `init`
pub fn run(config: &SystemConfig, init: bool) -> Result<()> {
    if init {
        match system_config::init_if_missing()? {
            Some(p) => println!("{} Wrote default config to {}", "✓".green(), p.display()),
            None => println!("{} Config already exists, left unchanged", "!".yellow()),
        }
        return Ok(());
    }

    let rendered = toml::to_string_pretty(config).context("Failed to render system config")?;
    print!("{}", rendered);
    Ok(())
}
