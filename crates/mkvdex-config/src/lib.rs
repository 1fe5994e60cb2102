//! Mkvdex Config - Configuration management for mkvdex.

mod config;
mod error;
mod paths;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use paths::{expand_path, AppPaths};
