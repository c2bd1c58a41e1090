//! Server configuration: optional TOML file plus environment overrides.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unidoc_core::{Catalog, ReportConfig};

/// Environment variable naming the TOML configuration file.
pub const CONFIG_ENV: &str = "UNIDOC_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        5000
    }

    /// Listen address. IPv6 hosts may be given with or without brackets.
    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.host.trim();
        let bare = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = bare.parse().map_err(|_| ConfigError::InvalidValue {
            key: "server.host".into(),
            value: self.host.clone(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    #[serde(default = "DatabaseConfig::default_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
        }
    }
}

impl DatabaseConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("consultations.db")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reports: ReportConfig,
    /// Rows appended to the built-in catalog
    #[serde(default)]
    pub catalog: Catalog,
}

impl Config {
    /// Load from the file named by `UNIDOC_CONFIG` (if set), then apply
    /// `UNIDOC_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `UNIDOC_HOST`, `UNIDOC_PORT`, `UNIDOC_DB_PATH` and
    /// `UNIDOC_REPORTS_DIR` as looked up by `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("UNIDOC_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("UNIDOC_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "UNIDOC_PORT".into(),
                    value: port.clone(),
                })?;
        }
        if let Some(path) = get("UNIDOC_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(dir) = get("UNIDOC_REPORTS_DIR") {
            self.reports.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Built-in catalog followed by the configured extra rows.
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::builtin();
        catalog.extend(self.catalog.clone());
        catalog
    }
}
