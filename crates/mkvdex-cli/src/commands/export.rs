//! Export command - media_info as CSV.

use super::{get_config, get_database};
use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_config::expand_path;
use std::path::Path;

pub fn run(file: &Path, delimiter: Option<char>) -> Result<()> {
    let config = get_config()?;
    let db = get_database(&config)?;

    let delimiter = match delimiter {
        Some(d) => d,
        None => config
            .export
            .delimiter
            .chars()
            .next()
            .context("export.delimiter is empty")?,
    };
    let path = expand_path(&file.to_string_lossy());

    let count = mkvdex_ingest::export_csv_file(&db, &path, delimiter)
        .with_context(|| format!("Failed to export to {}", path.display()))?;

    println!(
        "{} {} row(s) exported to {}",
        "Done:".green().bold(),
        count.to_string().green(),
        path.display()
    );

    Ok(())
}
