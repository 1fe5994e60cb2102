//! Configuration commands.

use anyhow::{Context, Result};
use colored::Colorize;
use mkvdex_config::{AppPaths, Config};

fn config_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

pub fn show() -> Result<()> {
    let paths = config_paths()?;

    if !paths.config_file.exists() {
        anyhow::bail!("Config file not found. Run 'mkvdex init' first.");
    }

    let contents =
        std::fs::read_to_string(&paths.config_file).context("Failed to read config file")?;

    println!("{}", "Current Configuration".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("{}", contents);

    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let paths = config_paths()?;

    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    config
        .set(key, value)
        .with_context(|| format!("Cannot set {}", key))?;
    config
        .save_to(&paths.config_file)
        .context("Failed to save config")?;

    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    Ok(())
}
