//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::AppPaths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r##"# mkvdex configuration

[general]
# Directory for the catalogue database and dumps
# data_dir = "~/.local/share/mkvdex"

[probe]
# Probe program, invoked as: <program> --Output=JSON <file>
program = "mediainfo"

# Kill a probe that runs longer than this
timeout_seconds = 300

# File extensions to scan for (case-insensitive, without the dot)
extensions = ["mkv"]

[ingest]
# Rows per upsert transaction
batch_size = 100

# Field delimiter of normalized dump files
delimiter = "#"

# Suffix of normalized dump files picked up by `mkvdex load`
dump_suffix = "_final.txt"

# Table replaced by `mkvdex load`
summary_table = "media_summary"

# Volume label used by `mkvdex upsert` when --volume is not given
# default_volume = "WD8A_10TB"

[search]
# Rows per result page
page_size = 10

[export]
# CSV field delimiter
delimiter = ","

[ollama]
# Ollama server address
host = "http://localhost:11434"

# Model for generating embeddings
embedding_model = "nomic-embed-text"

# Request timeout in seconds
timeout_seconds = 120

[ui]
# Enable colored output
color = true
"##
        .to_string()
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probe.timeout_seconds == 0 {
            return Err(ConfigError::invalid("probe.timeout_seconds", "must be positive"));
        }
        if self.probe.extensions.is_empty() {
            return Err(ConfigError::invalid("probe.extensions", "must not be empty"));
        }
        if self.ingest.batch_size == 0 {
            return Err(ConfigError::invalid("ingest.batch_size", "must be positive"));
        }
        if self.ingest.delimiter.is_empty() {
            return Err(ConfigError::invalid("ingest.delimiter", "must not be empty"));
        }
        if self.search.page_size == 0 {
            return Err(ConfigError::invalid("search.page_size", "must be positive"));
        }
        if self.export.delimiter.chars().count() != 1 {
            return Err(ConfigError::invalid("export.delimiter", "must be a single character"));
        }
        Ok(())
    }

    /// Set a value by its dotted key, e.g. `ingest.batch_size`.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["general", "data_dir"] => self.general.data_dir = Some(value.to_string()),
            ["probe", "program"] => self.probe.program = value.to_string(),
            ["probe", "timeout_seconds"] => self.probe.timeout_seconds = parse(key, value)?,
            ["probe", "extensions"] => {
                self.probe.extensions = value
                    .split(',')
                    .map(|e| e.trim().trim_start_matches('.').to_string())
                    .filter(|e| !e.is_empty())
                    .collect();
            }
            ["ingest", "batch_size"] => self.ingest.batch_size = parse(key, value)?,
            ["ingest", "delimiter"] => self.ingest.delimiter = value.to_string(),
            ["ingest", "dump_suffix"] => self.ingest.dump_suffix = value.to_string(),
            ["ingest", "summary_table"] => self.ingest.summary_table = value.to_string(),
            ["ingest", "default_volume"] => self.ingest.default_volume = Some(value.to_string()),
            ["search", "page_size"] => self.search.page_size = parse(key, value)?,
            ["export", "delimiter"] => self.export.delimiter = value.to_string(),
            ["ollama", "host"] => self.ollama.host = value.to_string(),
            ["ollama", "embedding_model"] => self.ollama.embedding_model = value.to_string(),
            ["ollama", "timeout_seconds"] => self.ollama.timeout_seconds = parse(key, value)?,
            ["ui", "color"] => self.ui.color = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        self.validate()
    }

    /// Application paths, honouring `general.data_dir`.
    pub fn paths(&self) -> ConfigResult<AppPaths> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Ok(match &self.general.data_dir {
            Some(dir) => paths.with_data_dir(dir),
            None => paths,
        })
    }
}

fn parse<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| ConfigError::invalid(key, e))
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Media probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub program: String,
    pub timeout_seconds: u64,
    pub extensions: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            program: "mediainfo".to_string(),
            timeout_seconds: 300,
            extensions: vec!["mkv".to_string()],
        }
    }
}

/// Dump and loader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub delimiter: String,
    pub dump_suffix: String,
    pub summary_table: String,
    pub default_volume: Option<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            delimiter: "#".to_string(),
            dump_suffix: "_final.txt".to_string(),
            summary_table: "media_summary".to_string(),
            default_volume: None,
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// CSV export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
        }
    }
}

/// Ollama embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub embedding_model: String,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// UI/Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { color: true }
    }
}
