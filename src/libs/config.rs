//! Configuration for hours.
//!
//! Settings live in a JSON file in the platform data directory (see
//! [`DataStorage`]). Every field is optional: a missing file, or a file
//! that only sets some fields, falls back to the defaults below.
//!
//! ```json
//! {
//!   "db_path": "~/hours.v1.db",
//!   "limits": {
//!     "report_max_days": 7,
//!     "stats_max_days": 3650,
//!     "task_list_limit": 500,
//!     "stats_limit": 10000
//!   }
//! }
//! ```
//!
//! The database location is resolved with this precedence:
//!
//! 1. `--dbpath` on the command line
//! 2. `db_path` in the configuration file
//! 3. `~/hours.v1.db`

use super::data_storage::{expand_tilde, DataStorage};
use crate::db::db::DB_FILE_NAME;
use crate::libs::time::{REPORT_MAX_DAYS, STATS_MAX_DAYS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default ceiling for task and log listings.
pub const TASK_LIST_LIMIT: u32 = 500;

/// Default ceiling for statistics rows.
pub const STATS_LIMIT: u32 = 10000;

/// Upper bounds applied by the reporting service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Longest explicit range, in days, for `log` and `report`
    pub report_max_days: u32,
    /// Longest explicit range, in days, for `stats`
    pub stats_max_days: u32,
    /// Ceiling for task and log listings
    pub task_list_limit: u32,
    /// Ceiling for statistics rows
    pub stats_limit: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            report_max_days: REPORT_MAX_DAYS,
            stats_max_days: STATS_MAX_DAYS,
            task_list_limit: TASK_LIST_LIMIT,
            stats_limit: STATS_LIMIT,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,

    #[serde(default)]
    pub limits: LimitsConfig,
}

impl Config {
    /// Reads the configuration from the data directory.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    /// Reads the configuration from `path`; a missing file yields the defaults.
    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to the data directory.
    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Resolves the database file location.
    pub fn db_path(&self, cli_override: Option<&str>, home: &Path) -> PathBuf {
        cli_override
            .or(self.db_path.as_deref())
            .map(|path| expand_tilde(path, home))
            .unwrap_or_else(|| home.join(DB_FILE_NAME))
    }
}
