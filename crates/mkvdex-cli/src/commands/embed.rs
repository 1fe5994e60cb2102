//! Embed command - generate embeddings for media records.

use super::{bar_style, get_config, get_database};
use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::ProgressBar;
use mkvdex_db::Database;
use mkvdex_ollama::{embedding_text, OllamaClient};
use tokio::runtime::Runtime;

/// Make sure the server is up and has the embedding model.
pub(crate) fn connect(config: &mkvdex_config::Config, rt: &Runtime) -> Result<OllamaClient> {
    let client =
        OllamaClient::from_config(&config.ollama).context("Failed to create Ollama client")?;

    if !rt.block_on(client.is_available()) {
        anyhow::bail!(
            "Ollama is not running at {}. Start it with 'ollama serve'.",
            config.ollama.host
        );
    }

    let model = &config.ollama.embedding_model;
    if !rt.block_on(client.has_model(model)).unwrap_or(false) {
        anyhow::bail!(
            "Model '{}' is not available. Run 'ollama pull {}' first.",
            model,
            model
        );
    }

    Ok(client)
}

pub fn run(batch_size: usize, rebuild: bool) -> Result<()> {
    if batch_size == 0 {
        anyhow::bail!("--batch-size must be positive");
    }

    let config = get_config()?;
    let db = get_database(&config)?;
    let rt = Runtime::new().context("Failed to create async runtime")?;
    let client = connect(&config, &rt)?;
    let model = config.ollama.embedding_model.as_str();

    if rebuild {
        let dropped = db.clear_media_embeddings()?;
        println!("{} Dropped {} existing embedding(s)", "→".cyan(), dropped);
    }

    let (embedded, total) = db.embedding_stats()?;
    let remaining = total - embedded;
    if total == 0 {
        println!(
            "{} Nothing to embed. Catalogue a volume first: {}",
            "Note:".yellow(),
            "mkvdex upsert <root>".cyan()
        );
        return Ok(());
    }
    if remaining == 0 {
        println!("{} All {} record(s) already have embeddings!", "✓".green(), total);
        return Ok(());
    }

    println!(
        "{} Generating embeddings for {} record(s) using '{}'",
        "→".cyan(),
        remaining.to_string().yellow(),
        model.cyan()
    );

    let pb = ProgressBar::new(remaining as u64);
    pb.set_style(bar_style()?);

    let outcome = embed_pending(&db, &client, model, batch_size, &rt, &pb);
    pb.finish_and_clear();
    let (done, errors) = outcome?;

    println!(
        "{} Generated {} embedding(s)",
        "✓".green(),
        done.to_string().green()
    );
    if errors > 0 {
        println!(
            "{} {} record(s) failed",
            "⚠".yellow(),
            errors.to_string().yellow()
        );
    }

    Ok(())
}

/// Embed every record without a vector. Returns `(embedded, failed)`.
fn embed_pending(
    db: &Database,
    client: &OllamaClient,
    model: &str,
    batch_size: usize,
    rt: &Runtime,
    pb: &ProgressBar,
) -> Result<(usize, usize)> {
    let mut done = 0;
    let mut failed = Vec::new();

    loop {
        // Records that failed stay unembedded; skip them instead of refetching forever
        let pending: Vec<_> = db
            .get_unembedded_media(batch_size + failed.len())?
            .into_iter()
            .filter(|(id, _)| !failed.contains(id))
            .take(batch_size)
            .collect();

        if pending.is_empty() {
            break;
        }

        for (id, full_json) in pending {
            match rt.block_on(client.embed(model, embedding_text(&full_json))) {
                Ok(vector) => {
                    db.store_media_embedding(id, &vector, model)?;
                    done += 1;
                }
                Err(e) => {
                    pb.println(format!("{} Record {}: {}", "Error:".red(), id, e));
                    failed.push(id);
                }
            }
            pb.inc(1);
        }
    }

    Ok((done, failed.len()))
}
