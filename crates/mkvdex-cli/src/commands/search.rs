//! Search command - paginated substring search.

use super::{get_config, get_database};
use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_core::{SchemaDescriptor, MEDIA_INFO_TABLE};
use mkvdex_db::{SearchPage, SearchRow};

/// Columns shown per hit, by table.
const MEDIA_INFO_DISPLAY: [&str; 6] = [
    "formatted_duration",
    "formatted_file_size",
    "video_format",
    "formatted_video_bit_rate",
    "hdr_format",
    "max_cll",
];
const SUMMARY_DISPLAY: [&str; 6] = [
    "duration",
    "file_size_gb",
    "video_codec",
    "video_bitrate",
    "hdr_format",
    "maxcll",
];

pub fn run(query: &str, page: usize, summary: bool) -> Result<()> {
    let config = get_config()?;
    let db = get_database(&config)?;

    let schema = if summary {
        SchemaDescriptor::summary(config.ingest.summary_table.as_str())
            .context("Invalid summary table name")?
    } else {
        SchemaDescriptor::media_info()
    };

    println!(
        "{} \"{}\" in {}",
        "Searching for:".cyan().bold(),
        query,
        schema.table()
    );
    println!("{}", "─".repeat(70));

    let results = db.search(&schema, query, page, config.search.page_size)?;

    if results.total == 0 {
        println!();
        println!("{}", "No results found.".dimmed());
        return Ok(());
    }
    if results.rows.is_empty() {
        println!();
        println!(
            "Page {} is past the end; there are {} page(s).",
            results.page, results.total_pages
        );
        return Ok(());
    }

    println!();
    for row in &results.rows {
        if summary {
            print_row(&results, row, "title", &SUMMARY_DISPLAY);
        } else {
            print_row(&results, row, "file_name", &MEDIA_INFO_DISPLAY);
        }
    }

    println!(
        "Page {} of {} ({} result{})",
        results.page,
        results.total_pages,
        results.total.to_string().green(),
        if results.total == 1 { "" } else { "s" }
    );
    if results.page < results.total_pages {
        let flag = if schema.table() == MEDIA_INFO_TABLE { "" } else { " --summary" };
        println!(
            "Next: {}",
            format!("mkvdex search \"{}\" --page {}{}", query, results.page + 1, flag).cyan()
        );
    }

    Ok(())
}

fn print_row(page: &SearchPage, row: &SearchRow, title: &str, details: &[&str]) {
    let name = page.value(row, title).unwrap_or("(untitled)");
    match page.value(row, "volume") {
        Some(volume) => println!("{} {}", name.white().bold(), format!("[{}]", volume).dimmed()),
        None => println!("{}", name.white().bold()),
    }

    let fields: Vec<&str> = details.iter().filter_map(|c| page.value(row, c)).collect();
    if !fields.is_empty() {
        println!("  {}", fields.join(" · "));
    }
    println!();
}
