//! Extract command - normalize a probe dump.

use super::get_config;
use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_config::expand_path;
use std::path::{Path, PathBuf};

/// `<dir>/<stem><suffix>`, e.g. `WD8A.txt` -> `WD8A_final.txt`.
fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", stem, suffix))
}

pub fn run(dump_file: &Path, output: Option<PathBuf>, delimiter: Option<String>) -> Result<()> {
    let config = get_config()?;

    let input = expand_path(&dump_file.to_string_lossy());
    let output = match output {
        Some(path) => expand_path(&path.to_string_lossy()),
        None => default_output(&input, &config.ingest.dump_suffix),
    };
    if output == input {
        anyhow::bail!("Output would overwrite the input dump {}", input.display());
    }
    let delimiter = delimiter.unwrap_or_else(|| config.ingest.delimiter.clone());

    let report = mkvdex_ingest::write_normalized_dump(&input, &output, &delimiter)
        .with_context(|| format!("Failed to normalize {}", input.display()))?;

    println!(
        "{} {} record(s) written to {}",
        "Done:".green().bold(),
        report.written.to_string().green(),
        output.display()
    );
    if report.rejected > 0 {
        println!("  {} skipped by the HEVC filter", report.rejected);
    }
    if report.failed > 0 {
        println!(
            "  {} {} line(s) could not be read (see log)",
            "⚠".yellow(),
            report.failed.to_string().yellow()
        );
    }

    Ok(())
}
