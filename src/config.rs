//! Runtime configuration.
//!
//! Read from a TOML file; a missing file means defaults. A few environment variables override
//! the file so deployments do not need to ship one:
//!
//! - `SCHEDULER_BIND`: address the service listens on
//! - `SCHEDULER_DATABASE_URL`: SQLite url of the record store
//! - `SCHEDULER_API_URL`: API root the command-line client talks to

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Serve over HTTPS when present
    pub tls: Option<TlsConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            tls: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/scheduler.db".into(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    /// A throwaway store, used by tests.
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000/api".into(),
        }
    }
}

impl Config {
    /// Loads `path` if it exists, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_owned(),
                source,
            })?;
            Config::from_toml(&text)?
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(bind) = lookup("SCHEDULER_BIND") {
            self.server.bind = bind.parse().map_err(|_| ConfigError::InvalidEnv {
                name: "SCHEDULER_BIND",
                value: bind.clone(),
            })?;
        }
        if let Some(url) = lookup("SCHEDULER_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(url) = lookup("SCHEDULER_API_URL") {
            self.client.api_url = url;
        }
        Ok(())
    }
}
