//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the last used identifier, the backend API URL, the web origin the
//! offline cache serves and the fetch timeout.
//!
//! Configuration is stored at `~/.config/smart-neighborhood/config.json`.
//! Environment variables override the file:
//! - `NEIGHBORHOOD_API_URL`
//! - `NEIGHBORHOOD_ORIGIN`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::DEFAULT_API_URL;
use crate::offline::DEFAULT_FETCH_TIMEOUT_SECS;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "smart-neighborhood";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Web origin the front-end is served from by default
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

pub const API_URL_ENV: &str = "NEIGHBORHOOD_API_URL";
pub const ORIGIN_ENV: &str = "NEIGHBORHOOD_ORIGIN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_identifier: Option<String>,
    pub api_url: Option<String>,
    pub origin: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
}

impl Config {
    /// Load the config file. Environment overrides are not applied; see
    /// `with_env`.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Apply environment overrides. The result is meant for use, not for
    /// saving back.
    pub fn with_env(mut self) -> Self {
        self.apply_env(|key| std::env::var(key).ok());
        self
    }

    fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and the offline cache.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Some(origin) = non_empty(ORIGIN_ENV) {
            self.origin = Some(origin);
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}
