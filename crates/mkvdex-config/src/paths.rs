//! Application paths management.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Database file name inside the data directory.
pub const DATABASE_FILE_NAME: &str = "mkvdex.db";

/// Platform locations for the config file, the catalogue database and dumps.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
    pub dump_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppPaths {
    /// Create paths using platform-specific directories.
    pub fn new() -> Option<Self> {
        let proj_dirs = ProjectDirs::from("com", "mkvdex", "mkvdex")?;

        let config_dir = proj_dirs.config_dir().to_path_buf();
        let data_dir = proj_dirs.data_dir().to_path_buf();

        Some(Self::from_dirs(config_dir, data_dir))
    }

    fn from_dirs(config_dir: PathBuf, data_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join("config.toml"),
            database_file: data_dir.join(DATABASE_FILE_NAME),
            dump_dir: data_dir.join("dumps"),
            log_dir: data_dir.join("logs"),
            config_dir,
            data_dir,
        }
    }

    /// Move everything except the config file under another data directory.
    ///
    /// `~` is expanded.
    pub fn with_data_dir(self, data_dir: &str) -> Self {
        Self::from_dirs(self.config_dir, expand_path(data_dir))
    }

    /// Create all necessary directories.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.dump_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Check if mkvdex has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }

    /// Default location of a dump file with the given name.
    pub fn dump_file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dump_dir.join(name)
    }
}

/// Expand a leading `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    match shellexpand::full(path) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(path).as_ref()),
    }
}
