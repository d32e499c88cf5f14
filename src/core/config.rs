//! Configuration management
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults
//! 2. `config.yaml` in the platform config directory
//! 3. Environment variables and command-line flags (both resolved by clap)

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::api::DEFAULT_LIMIT;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const CONFIG_FILE: &str = "config.yaml";

/// Where records are kept
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON file in the data directory
    #[default]
    Local,
    /// REST API at the configured URL
    Remote,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yml::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Contents of `config.yaml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub backend: Option<BackendKind>,
    pub data_dir: Option<PathBuf>,
    pub page_size: Option<u32>,
    /// Request timeout in seconds
    pub timeout: Option<u64>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Some(Self::default()));
        }

        serde_yml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Apply another layer on top of this one
    pub fn merge(&mut self, other: ConfigFile) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub page_size: u32,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load the config file (if any) and apply command-line overrides
    pub fn load(overrides: ConfigFile) -> Result<Self, ConfigError> {
        let mut layered = match Self::config_path() {
            Some(path) => {
                let file = ConfigFile::load(&path)?;
                if file.is_some() {
                    debug!("Loaded config from {}", path.display());
                }
                file.unwrap_or_default()
            }
            None => ConfigFile::default(),
        };
        layered.merge(overrides);
        Self::resolve(layered)
    }

    /// Fill unset keys with defaults and check the result
    pub fn resolve(layered: ConfigFile) -> Result<Self, ConfigError> {
        let api_url = layered
            .api_url
            .map(|u| u.trim().to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "api_url",
                reason: format!("'{}' is not an http(s) URL", api_url),
            });
        }

        let page_size = layered.page_size.unwrap_or(DEFAULT_LIMIT);
        if page_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            api_url,
            backend: layered.backend.unwrap_or_default(),
            data_dir: layered.data_dir.unwrap_or_else(default_data_dir),
            page_size,
            timeout: layered.timeout.filter(|s| *s > 0).map(Duration::from_secs),
        })
    }

    /// Path of the user config file, when a home directory is known
    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "claimdesk")
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".claimdesk"))
}
