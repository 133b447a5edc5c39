//! Configuration for the `dlreason` CLI tools.
//!
//! Layered the way the teacher's Datalog engine layers its config: a
//! `config.toml`, an optional git-ignored `config.local.toml`, then
//! environment variables. The prefix is `ENGINE_` (double-underscore
//! separated for nested keys) instead of the teacher's `FLOWLOG_`.
//!
//! ```toml
//! # config.toml
//! [store]
//! dirname = "/var/lib/dlreason"
//!
//! [weights]
//! default_mode = 0
//! ```
//!
//! ```bash
//! ENGINE_STORE__DIRNAME=/custom/path
//! ```

use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::weight::WeightMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding database files, used by `-l` and the default
    /// database path when `-d` is not given.
    pub dirname: PathBuf,

    /// Database filename used when the caller does not pass one.
    #[serde(default = "default_dbname")]
    pub default_dbname: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightConfig {
    /// Weight generation mode used by `import` when `-w` is not given.
    #[serde(default)]
    pub default_mode: WeightMode,
}

impl Default for WeightConfig {
    fn default() -> Self {
        WeightConfig {
            default_mode: WeightMode::Constant,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_dbname() -> String {
    "noname.sqlite3".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default search locations, falling back
    /// to built-in defaults when no files are present.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("ENGINE_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        let dirname = dirs_home().join("dlreason");
        Config {
            store: StoreConfig {
                dirname,
                default_dbname: default_dbname(),
            },
            weights: WeightConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Lists the database filenames found directly under `dirname`, for the
/// `-l` flag shared by all three CLI tools. Non-files (subdirectories) are
/// skipped; a missing directory yields an empty list rather than an error,
/// since `-l` on a fresh install should just report "nothing yet".
pub fn list_databases(dirname: &std::path::Path) -> std::io::Result<Vec<String>> {
    let entries = match std::fs::read_dir(dirname) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Initializes the global `tracing` subscriber from the configured level,
/// overridable with `RUST_LOG` per `tracing-subscriber`'s usual convention.
pub fn init_logging(cfg: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.level.clone()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
