//! Server configuration: TOML file, overridden by command-line flags.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use scheduler_core::StoreConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Command-line flags. Anything given here wins over the config file.
#[derive(Parser, Debug)]
#[command(name = "scheduler-server", version, about = "HTTP backend for a scheduler UI")]
pub struct Args {
    /// Config file (default: <config dir>/scheduler/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Directory of static files served for non-API paths
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    pub write_config: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,

    /// Default log filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub database: StoreConfig,
}

impl Config {
    /// Default config location: ~/.config/scheduler/config.toml on Linux
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("scheduler");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, falling back to defaults when it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(database) = &args.database {
            self.database.path = database.clone();
        }
        if let Some(static_dir) = &args.static_dir {
            self.server.static_dir = Some(static_dir.clone());
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .with_context(|| format!("Invalid host address '{}'", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let database = StoreConfig::default();
        let contents = format!(
            "\
# scheduler-server configuration

[server]
# host = \"{DEFAULT_HOST}\"
# port = {DEFAULT_PORT}

# Serve the scheduler UI from this directory:
# static_dir = \"public\"

# Overridden by RUST_LOG when set:
# log_level = \"{DEFAULT_LOG_LEVEL}\"

[database]
# path = \"{}\"
# pool_size = {}
# connection_timeout_secs = {}
# busy_timeout_ms = {}
",
            database.path.display(),
            database.pool_size,
            database.connection_timeout_secs,
            database.busy_timeout_ms,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Could not create config directory")?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Could not write {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.static_dir, None);
        assert_eq!(config.database, StoreConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8080\nstatic_dir = \"public\"\n\n[database]\npool_size = 4\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.static_dir, Some(PathBuf::from("public")));
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_default_config_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scheduler").join("config.toml");
        Config::create_default_config(&path).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.pool_size, 10);
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::default();
        let args = Args::parse_from([
            "scheduler-server",
            "--port",
            "9000",
            "--host",
            "0.0.0.0",
            "--database",
            "/tmp/events.db",
        ]);
        config.apply_args(&args);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/events.db"));
        assert_eq!(
            config.bind_addr().unwrap(),
            "0.0.0.0:9000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let mut config = Config::default();
        config.server.host = "localhost:80".to_string();
        assert!(config.bind_addr().is_err());
    }
}
