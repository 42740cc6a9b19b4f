//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend base URL, the last signed-in email, and the cache staleness
//! window.
//!
//! Configuration is stored at `~/.config/towncache/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "towncache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides the configured base URL
const BASE_URL_ENV: &str = "TOWNCACHE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
    pub cache_stale_minutes: Option<i64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Base URL for the API client. Environment beats config beats default.
    pub fn resolved_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Staleness window for the fetch cache.
    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_stale_minutes.unwrap_or(5))
    }
}
