//! Upsert command - probe a volume straight into media_info.

use super::{bar_style, get_config, get_database, get_prober};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;
use mkvdex_config::expand_path;
use mkvdex_ingest::UpsertLoader;
use std::path::Path;

pub fn run(root: &Path, volume: Option<String>, batch_size: Option<usize>) -> Result<()> {
    let config = get_config()?;

    let volume = volume
        .or_else(|| config.ingest.default_volume.clone())
        .context("No volume given. Pass --volume or set ingest.default_volume.")?;
    let batch_size = batch_size.unwrap_or(config.ingest.batch_size);

    let db = get_database(&config)?;
    let prober = get_prober(&config)?;
    let root = expand_path(&root.to_string_lossy());

    let loader = UpsertLoader::new(&db, &prober, volume.as_str())
        .with_batch_size(batch_size)
        .with_extensions(config.probe.extensions.clone());

    println!("{} {}", "Scanning:".cyan(), root.display());
    let files = loader
        .scan(&root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    if files.is_empty() {
        println!("{}", "No media files found.".yellow());
        return Ok(());
    }

    println!(
        "Found {} file(s), volume {}, batches of {}",
        files.len(),
        volume.cyan(),
        batch_size
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(bar_style()?);

    let report = loader.load_files(&files, |path| {
        let name = path.file_name().unwrap_or(path.as_os_str());
        pb.set_message(name.to_string_lossy().to_string());
        pb.inc(1);
    });
    pb.finish_and_clear();
    let report = report.context("Upsert aborted; the failed batch was rolled back")?;

    println!(
        "{} {} file(s) on {}: {} new, {} updated, {} batch(es)",
        "Done:".green().bold(),
        report.ingested.to_string().green(),
        volume.cyan(),
        report.inserted,
        report.updated,
        report.flushes.len()
    );

    if !report.errors.is_empty() {
        println!(
            "{} {} file(s) could not be probed:",
            "⚠".yellow(),
            report.errors.len().to_string().yellow()
        );
        for (path, reason) in &report.errors {
            println!("  {} {}", path.display(), reason.dimmed());
        }
    }

    Ok(())
}
