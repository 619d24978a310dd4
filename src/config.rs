//! Application configuration management.
//!
//! Configuration covers where the published bundle lives and where cached
//! copies go. It is stored at `~/.config/checkmate/config.json`; the bundle
//! URL can also come from the `CHECKMATE_BUNDLE_URL` environment variable.

use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// Application name used for config/cache/state directory paths
const APP_NAME: &str = "checkmate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// State store file name (activeTab, theme, itemDone:* entries)
const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Base URL of the published checklist bundle. With no URL configured
    /// the app runs cache-only.
    pub bundle_url: Option<String>,
    /// Override for the cache root; defaults to the platform cache dir.
    pub cache_root: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("CHECKMATE_BUNDLE_URL") {
            if !url.is_empty() {
                config.bundle_url = Some(url);
            }
        }
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_root(&self) -> Result<PathBuf> {
        if let Some(ref root) = self.cache_root {
            return Ok(root.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn state_path(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join(STATE_FILE))
    }
}
