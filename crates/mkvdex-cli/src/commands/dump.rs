//! Dump command - probe a tree into a JSON Lines file.

use super::{get_config, get_prober};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mkvdex_config::expand_path;
use std::path::Path;
use std::time::Duration;

pub fn run(root: &Path, dump_file: &Path) -> Result<()> {
    let config = get_config()?;
    let prober = get_prober(&config)?;

    let root = expand_path(&root.to_string_lossy());
    let dump_file = expand_path(&dump_file.to_string_lossy());

    println!("{} {}", "Scanning:".cyan(), root.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = mkvdex_ingest::write_probe_dump(
        &root,
        &config.probe.extensions,
        &prober,
        &dump_file,
        |path| {
            let name = path.file_name().unwrap_or(path.as_os_str());
            pb.set_message(format!("Probing {}", name.to_string_lossy()));
        },
    )
    .with_context(|| format!("Failed to dump {}", root.display()))?;

    pb.finish_and_clear();

    if let Some(backup) = &report.backup {
        println!("  Previous dump saved as {}", backup.display());
    }
    println!(
        "{} {} of {} file(s) written to {}",
        "Done:".green().bold(),
        report.written.to_string().green(),
        report.scanned,
        dump_file.display()
    );

    if !report.errors.is_empty() {
        println!();
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
