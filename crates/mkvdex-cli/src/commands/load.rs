//! Load command - replace the summary table from normalized dumps.

use super::{confirm, get_config, get_database, get_paths};
use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_config::expand_path;
use mkvdex_core::SchemaDescriptor;
use std::path::PathBuf;

pub fn run(
    dir: Option<PathBuf>,
    suffix: Option<String>,
    table: Option<String>,
    replace: bool,
) -> Result<()> {
    let config = get_config()?;
    let db = get_database(&config)?;

    let dir = match dir {
        Some(dir) => expand_path(&dir.to_string_lossy()),
        None => get_paths(&config)?.dump_dir,
    };
    let suffix = suffix.unwrap_or_else(|| config.ingest.dump_suffix.clone());
    let table = table.unwrap_or_else(|| config.ingest.summary_table.clone());
    let schema = SchemaDescriptor::summary(&table).context("Invalid table name")?;

    let files = mkvdex_ingest::find_dump_files(&dir, &suffix)
        .with_context(|| format!("Cannot read {}", dir.display()))?;
    if files.is_empty() {
        println!(
            "{} No files ending with {} in {}. Nothing loaded.",
            "Note:".yellow(),
            suffix.cyan(),
            dir.display()
        );
        return Ok(());
    }

    println!("{} {} dump file(s):", "Found".cyan(), files.len());
    for file in &files {
        println!("  {}", file.display());
    }

    let existing = db.count_rows(&table)?;
    if !replace {
        let prompt = format!(
            "This deletes all {} row(s) in {} before loading. Continue?",
            existing, table
        );
        if !confirm(&prompt)? {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let report = mkvdex_ingest::load_summary_tables(
        &db,
        &dir,
        &suffix,
        &config.ingest.delimiter,
        &schema,
    )
    .context("Failed to load dumps")?;

    if !report.replaced {
        println!("{} No dump could be read; {} left untouched.", "⚠".yellow(), table);
        return Ok(());
    }

    println!(
        "{} {} row(s) loaded into {} ({} replaced)",
        "Done:".green().bold(),
        report.rows.to_string().green(),
        table.cyan(),
        report.deleted
    );
    if report.skipped_lines > 0 {
        println!(
            "  {} {} line(s) had too many fields and were skipped",
            "⚠".yellow(),
            report.skipped_lines
        );
    }
    for file in &report.failed_files {
        println!("  {} could not read {}", "⚠".yellow(), file.display());
    }

    Ok(())
}
