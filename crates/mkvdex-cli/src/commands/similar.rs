//! Similar command - nearest neighbours of a text query.

use super::{embed::connect, get_config, get_database};
use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_ollama::embedding_text;
use tokio::runtime::Runtime;

pub fn run(text: &str, k: usize) -> Result<()> {
    if k == 0 {
        anyhow::bail!("-k must be positive");
    }

    let config = get_config()?;
    let db = get_database(&config)?;

    let (embedded, total) = db.embedding_stats()?;
    if embedded == 0 {
        if total == 0 {
            anyhow::bail!("The catalogue is empty. Run 'mkvdex upsert <root>' first.");
        }
        anyhow::bail!("No embeddings found. Run 'mkvdex embed' first.");
    }

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let client = connect(&config, &rt)?;
    let query = rt
        .block_on(client.embed(&config.ollama.embedding_model, embedding_text(text)))
        .context("Failed to embed query")?;

    let hits = db.nearest_media(&query, k)?;

    println!("{} \"{}\"", "Closest to:".cyan().bold(), text);
    println!("{}", "─".repeat(70));

    if hits.is_empty() {
        println!();
        println!(
            "{}",
            "No comparable embeddings. Were they made with another model? Try 'mkvdex embed --rebuild'."
                .dimmed()
        );
        return Ok(());
    }

    println!();
    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{:>2}. {} {} {}",
            rank + 1,
            hit.file_name.white().bold(),
            format!("[{}]", hit.volume).dimmed(),
            format!("distance {:.4}", hit.distance).dimmed()
        );
    }

    Ok(())
}
