//! Initialize mkvdex.

use super::{get_config, get_paths};
use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_config::Config;
use mkvdex_db::Database;

pub fn run() -> Result<()> {
    let config = get_config()?;
    let paths = get_paths(&config)?;

    // Check if already initialized
    if paths.is_initialized() {
        println!("{} mkvdex is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing mkvdex...".cyan().bold());

    paths
        .ensure_dirs()
        .context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    if !paths.config_file.exists() {
        Config::create_default_file(&paths.config_file)
            .context("Failed to create config file")?;
    }
    println!(
        "  {} Config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    let _db = Database::open(&paths.database_file).context("Failed to initialize database")?;
    println!(
        "  {} Created database: {}",
        "✓".green(),
        paths.database_file.display()
    );

    for (tool, available) in mkvdex_process::check_dependencies(&config.probe.program) {
        if available {
            println!("  {} Found {}", "✓".green(), tool);
        } else {
            println!(
                "  {} {} not found on PATH; dump and upsert need it",
                "⚠".yellow(),
                tool
            );
        }
    }

    println!();
    println!("{}", "mkvdex initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Set a default volume: {}",
        "mkvdex config set ingest.default_volume WD8A".cyan()
    );
    println!(
        "  2. Catalogue a drive: {}",
        "mkvdex upsert /mnt/WD8A".cyan()
    );
    println!("  3. Look around: {}", "mkvdex stats".cyan());

    Ok(())
}
