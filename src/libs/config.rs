//! Configuration management for the vitalog application.
//!
//! A single JSON file (`config.json`) in the platform data directory holds the
//! few tunables this layer exposes: the database file name (mainly useful for
//! keeping several isolated stores side by side) and the age threshold after
//! which an incomplete task counts as stale.

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Default number of days after which an incomplete task is considered stale.
pub const DEFAULT_STALE_TASK_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database file name inside the application data directory.
    #[serde(default = "default_db_file")]
    pub db_file: String,

    /// Age in days after which an incomplete, non-cancelled task is stale.
    #[serde(default = "default_stale_days")]
    pub stale_task_days: i64,
}

fn default_db_file() -> String {
    "vitalog.db".to_string()
}

fn default_stale_days() -> i64 {
    DEFAULT_STALE_TASK_DAYS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
            stale_task_days: default_stale_days(),
        }
    }
}

impl Config {
    /// Loads the configuration file, falling back to defaults when the file
    /// is missing or unreadable. A parse failure is reported but never fatal.
    pub fn read() -> Result<Self> {
        let path = DataStorage::new().get_path(CONFIG_FILE_NAME).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)?;
        match serde_json::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                msg_error!(Message::ConfigParseError(e.to_string()));
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = DataStorage::new().get_path(CONFIG_FILE_NAME).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        msg_debug!(Message::ConfigSaved);
        Ok(())
    }
}
