//! Database configuration, the `[database]` table of the server config file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("scheduler"))
        .unwrap_or_default()
        .join("events.db")
}

fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout_secs() -> u64 {
    30
}

fn default_busy_timeout_ms() -> u32 {
    5_000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    /// Number of pooled connections, fixed for the life of the process
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// How long an operation waits for a free connection before failing
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,

    /// How long SQLite waits on a locked database before returning SQLITE_BUSY
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: default_database_path(),
            pool_size: default_pool_size(),
            connection_timeout_secs: default_connection_timeout_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            path: path.into(),
            ..StoreConfig::default()
        }
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}
