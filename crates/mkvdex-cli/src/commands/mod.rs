//! CLI command implementations.

pub mod config;
pub mod diff;
pub mod dump;
pub mod embed;
pub mod export;
pub mod extract;
pub mod init;
pub mod load;
pub mod search;
pub mod similar;
pub mod stats;
pub mod upsert;

use anyhow::{Context, Result};
use indicatif::ProgressStyle;
use mkvdex_config::{AppPaths, Config};
use mkvdex_db::Database;
use mkvdex_process::MediaInfoProber;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::debug;

/// Load the configuration, falling back to defaults when there is no file.
pub fn get_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Get the application paths, honouring `general.data_dir`.
pub fn get_paths(config: &Config) -> Result<AppPaths> {
    config
        .paths()
        .context("Failed to determine application directories")
}

/// Open the catalogue database, ensuring mkvdex is initialized.
pub fn get_database(config: &Config) -> Result<Database> {
    let paths = get_paths(config)?;

    if !paths.is_initialized() {
        anyhow::bail!("mkvdex is not initialized. Run 'mkvdex init' first.");
    }

    debug!("Opening database at {}", paths.database_file.display());
    Database::open(&paths.database_file).context("Failed to open database")
}

/// Build the probe runner from `[probe]`.
pub fn get_prober(config: &Config) -> Result<MediaInfoProber> {
    MediaInfoProber::new(
        config.probe.program.clone(),
        Duration::from_secs(config.probe.timeout_seconds),
    )
    .with_context(|| format!("Cannot run {}", config.probe.program))
}

/// Honour `ui.color = false`.
pub fn apply_color_setting() {
    if let Ok(config) = Config::load() {
        if !config.ui.color {
            colored::control::set_override(false);
        }
    }
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` is a no.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (y/n): ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Bar style shared by the long-running commands.
pub fn bar_style() -> Result<ProgressStyle> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
        .progress_chars("█▓░"))
}

/// Format a byte count in human-readable form.
pub fn format_size(bytes: i64) -> String {
    mkvdex_core::format_file_size(bytes.max(0) as u64)
}
