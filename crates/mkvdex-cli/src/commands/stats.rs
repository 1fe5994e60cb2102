//! Stats command - show catalogue statistics.

use super::{format_size, get_config, get_database};
use anyhow::Result;
use colored::Colorize;

pub fn run() -> Result<()> {
    let config = get_config()?;
    let db = get_database(&config)?;
    let stats = db.get_stats(&config.ingest.summary_table)?;

    println!("{}", "mkvdex Statistics".cyan().bold());
    println!("{}", "─".repeat(50));

    println!();
    println!("{}", "Catalogue".white().bold());
    println!("  Media files: {}", stats.total_media.to_string().green());
    for (volume, count) in &stats.media_by_volume {
        println!("    {}: {}", volume, count);
    }
    println!("  HEVC: {}", stats.hevc_media);
    println!("  4K: {}", stats.uhd_media);
    println!("  HDR: {}", stats.hdr_media);

    println!();
    println!("{}", "Summary table".white().bold());
    println!(
        "  {}: {} row(s)",
        config.ingest.summary_table, stats.summary_rows
    );

    println!();
    println!("{}", "Semantic index".white().bold());
    println!(
        "  Embedded: {} / {}",
        stats.embedded_media, stats.total_media
    );

    println!();
    println!("{}", "Tools".white().bold());
    for (tool, available) in mkvdex_process::check_dependencies(&config.probe.program) {
        if available {
            println!("  {} {}", "✓".green(), tool);
        } else {
            println!("  {} {} (not on PATH)", "✗".red(), tool);
        }
    }
    if !mkvdex_process::all_tools_available(&config.probe.program) {
        println!("  dump and upsert are unavailable until it is installed");
    }

    println!();
    println!("{}", "Storage".white().bold());
    println!("  Database size: {}", format_size(stats.database_size_bytes));

    Ok(())
}
