//! Diff command - compare two media trees and copy what is missing.

use super::{confirm, format_size, get_config};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mkvdex_config::expand_path;
use std::path::{Path, PathBuf};

pub fn run(left: &Path, right: &Path, copy: bool) -> Result<()> {
    let config = get_config()?;
    let left = expand_path(&left.to_string_lossy());
    let right = expand_path(&right.to_string_lossy());

    let diff = mkvdex_ingest::diff_trees(&left, &right, &config.probe.extensions)
        .context("Failed to compare trees")?;

    print_side(&diff.left_only, &left);
    print_side(&diff.right_only, &right);

    if !copy || diff.is_empty() {
        return Ok(());
    }

    if !diff.left_only.is_empty() {
        offer_copy(&diff.left_only, &left, &right)?;
    }
    if !diff.right_only.is_empty() {
        offer_copy(&diff.right_only, &right, &left)?;
    }

    Ok(())
}

fn print_side(files: &[PathBuf], root: &Path) {
    println!();
    if files.is_empty() {
        println!("{} {}", "No unique files in".dimmed(), root.display());
        return;
    }

    println!("{} {}:", "Files only in".cyan().bold(), root.display());
    for file in files {
        println!("  {}", file.display());
    }
}

fn offer_copy(files: &[PathBuf], from: &Path, to: &Path) -> Result<()> {
    println!();
    let prompt = format!(
        "Copy {} missing file(s) from {} to {}?",
        files.len(),
        from.display(),
        to.display()
    );
    if !confirm(&prompt)? {
        return Ok(());
    }

    let total: u64 = files
        .iter()
        .filter_map(|f| std::fs::metadata(from.join(f)).ok())
        .map(|m| m.len())
        .sum();

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("█▓░"),
    );

    let copied = mkvdex_ingest::copy_missing(from, to, files, |n| pb.inc(n));
    pb.finish_and_clear();
    let copied = copied.context("Copy failed")?;

    println!(
        "{} Copied {} file(s), {}",
        "✓".green(),
        files.len(),
        format_size(copied as i64)
    );
    Ok(())
}
