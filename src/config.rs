//! Configuration file and data directory handling.
//!
//! Settings live in `config.toml` inside the data directory (`$TASKS_HOME`,
//! or `~/.tasks`). Command-line flags always win over the file.
//!
//! ```toml
//! [storage]
//! format = "sqlite"
//! path = "tasks.db"
//!
//! [log]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fields::StoreFormat;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub log: LogConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub format: Option<StoreFormat>,
    /// Relative paths are resolved against the data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Any `tracing_subscriber::EnvFilter` directive, e.g. `info` or `task_tracker=debug`.
    pub level: Option<String>,
}

/// Where the task store lives and how it is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub format: StoreFormat,
    pub path: PathBuf,
}

/// Directory holding the config file and the default store. Falls back to
/// the current directory when no home directory is known.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("TASKS_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".tasks"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Work out the store to use. An explicit path or format from the command
    /// line wins; otherwise the config file; otherwise a JSON file in the data
    /// directory. A format that is not given is guessed from the extension.
    pub fn resolve_store(
        &self,
        cli_path: Option<&Path>,
        cli_format: Option<StoreFormat>,
        data_dir: &Path,
    ) -> StoreLocation {
        let configured_path = self.storage.path.as_ref().map(|p| {
            if p.is_relative() {
                data_dir.join(p)
            } else {
                p.clone()
            }
        });

        let format = cli_format
            .or_else(|| cli_path.and_then(StoreFormat::from_path))
            .or(self.storage.format)
            .or_else(|| configured_path.as_deref().and_then(StoreFormat::from_path))
            .unwrap_or_default();

        let path = cli_path
            .map(Path::to_path_buf)
            .or(configured_path)
            .unwrap_or_else(|| data_dir.join(format.default_file_name()));

        StoreLocation { format, path }
    }
}
