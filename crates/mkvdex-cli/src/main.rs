//! mkvdex CLI - Catalogue the media files on your drives

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// mkvdex - Catalogue the media files on your drives
#[derive(Parser)]
#[command(name = "mkvdex")]
#[command(version)]
#[command(about = "Probe, normalize and catalogue MKV media metadata", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize mkvdex (create config and database)
    Init,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Probe every media file under a directory into a JSON Lines dump
    Dump {
        /// Directory to scan
        root: PathBuf,

        /// Dump file to write (an existing one is backed up first)
        dump_file: PathBuf,
    },

    /// Normalize a probe dump into a delimited dump
    Extract {
        /// Probe dump to read
        dump_file: PathBuf,

        /// Output file (default: <stem>_final.txt next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter (default: from config)
        #[arg(short, long)]
        delimiter: Option<String>,
    },

    /// Replace the summary table with every normalized dump in a directory
    Load {
        /// Directory holding the dumps (default: the dump directory)
        dir: Option<PathBuf>,

        /// File name suffix of normalized dumps (default: from config)
        #[arg(long)]
        suffix: Option<String>,

        /// Target table (default: from config)
        #[arg(long)]
        table: Option<String>,

        /// Replace existing rows without asking
        #[arg(long)]
        replace: bool,
    },

    /// Probe a volume and merge the results into media_info
    Upsert {
        /// Root directory of the volume
        root: PathBuf,

        /// Volume label (default: ingest.default_volume)
        #[arg(long)]
        volume: Option<String>,

        /// Rows per transaction (default: from config)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Search the catalogue
    Search {
        /// Text to look for in any column
        query: String,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Search the summary table instead of media_info
        #[arg(long)]
        summary: bool,
    },

    /// Export media_info as CSV
    Export {
        /// Output file
        file: PathBuf,

        /// Field delimiter (default: from config)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Compare the media files of two directory trees
    Diff {
        /// First tree
        left: PathBuf,

        /// Second tree
        right: PathBuf,

        /// Offer to copy files missing on either side
        #[arg(long)]
        copy: bool,
    },

    /// Generate embeddings for semantic search
    Embed {
        /// Records fetched per round
        #[arg(long, default_value = "10")]
        batch_size: usize,

        /// Drop existing embeddings first (e.g. after changing model)
        #[arg(long)]
        rebuild: bool,
    },

    /// Find the media whose probe data is closest to a description
    Similar {
        /// Free text, e.g. "dolby vision 4k"
        text: String,

        /// Number of results
        #[arg(short, default_value = "5")]
        k: usize,
    },

    /// Show catalogue statistics
    Stats,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., ingest.batch_size)
        key: String,

        /// Value to set
        value: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mkvdex=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mkvdex=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    commands::apply_color_setting();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value),
        },
        Commands::Dump { root, dump_file } => commands::dump::run(&root, &dump_file),
        Commands::Extract {
            dump_file,
            output,
            delimiter,
        } => commands::extract::run(&dump_file, output, delimiter),
        Commands::Load {
            dir,
            suffix,
            table,
            replace,
        } => commands::load::run(dir, suffix, table, replace),
        Commands::Upsert {
            root,
            volume,
            batch_size,
        } => commands::upsert::run(&root, volume, batch_size),
        Commands::Search {
            query,
            page,
            summary,
        } => commands::search::run(&query, page, summary),
        Commands::Export { file, delimiter } => commands::export::run(&file, delimiter),
        Commands::Diff { left, right, copy } => commands::diff::run(&left, &right, copy),
        Commands::Embed {
            batch_size,
            rebuild,
        } => commands::embed::run(batch_size, rebuild),
        Commands::Similar { text, k } => commands::similar::run(&text, k),
        Commands::Stats => commands::stats::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_upsert_arguments() {
        let cli = Cli::try_parse_from(["mkvdex", "upsert", "/mnt/WD8A", "--volume", "WD8A", "--batch-size", "50"])
            .unwrap();
        match cli.command {
            Commands::Upsert {
                root,
                volume,
                batch_size,
            } => {
                assert_eq!(root, PathBuf::from("/mnt/WD8A"));
                assert_eq!(volume.as_deref(), Some("WD8A"));
                assert_eq!(batch_size, Some(50));
            }
            _ => panic!("expected upsert"),
        }
    }

    #[test]
    fn test_similar_defaults_to_five() {
        let cli = Cli::try_parse_from(["mkvdex", "similar", "dolby vision"]).unwrap();
        assert!(matches!(cli.command, Commands::Similar { k: 5, .. }));
    }
}
