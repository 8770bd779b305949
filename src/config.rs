//! Configuration loading and management
//!
//! Handles parsing of `todo.toml` configuration files.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = "todo.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Task list settings
    #[serde(default)]
    pub list: ListConfig,
}

/// Remote server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server origin; endpoints live under `{origin}/api/`
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_origin() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Task list configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawListConfig")]
pub struct ListConfig {
    /// Initial page size; the first of `page_sizes` when not set
    pub page_size: u32,

    /// Page sizes the user can switch between
    pub page_sizes: Vec<u32>,
}

#[derive(Deserialize)]
struct RawListConfig {
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default = "default_page_sizes")]
    page_sizes: Vec<u32>,
}

impl From<RawListConfig> for ListConfig {
    fn from(raw: RawListConfig) -> Self {
        let page_size = raw
            .page_size
            .or_else(|| raw.page_sizes.first().copied())
            .unwrap_or_else(default_page_size);
        Self {
            page_size,
            page_sizes: raw.page_sizes,
        }
    }
}

fn default_page_size() -> u32 {
    5
}

fn default_page_sizes() -> Vec<u32> {
    vec![5, 10, 20]
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            page_sizes: default_page_sizes(),
        }
    }
}

impl Config {
    /// Load configuration from a `todo.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or the user config file when present,
    /// or return defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Override the server origin (from `--server` / `TODO_SERVER`).
    pub fn with_origin(mut self, origin: Option<String>) -> Result<Self> {
        if let Some(origin) = origin {
            self.server.origin = origin;
            self.server.validate()?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.list.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<()> {
        let origin = self.origin.trim();
        if origin.is_empty() {
            return Err(Error::InvalidConfig(
                "server.origin cannot be empty".to_string(),
            ));
        }
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "server.origin '{origin}' must start with http:// or https://"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "server.timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl ListConfig {
    fn validate(&self) -> Result<()> {
        if self.page_sizes.is_empty() {
            return Err(Error::InvalidConfig(
                "list.page_sizes cannot be empty".to_string(),
            ));
        }
        if self.page_sizes.iter().any(|size| *size == 0) {
            return Err(Error::InvalidConfig(
                "list.page_sizes entries must be > 0".to_string(),
            ));
        }
        if !self.page_sizes.contains(&self.page_size) {
            return Err(Error::InvalidConfig(format!(
                "list.page_size {} not in list.page_sizes",
                self.page_size
            )));
        }
        Ok(())
    }
}

/// Per-user config file location (`~/.config/todo/todo.toml` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "todo")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}
