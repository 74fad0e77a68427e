//! Configuration
//!
//! Loaded from `~/.config/encore/config.toml` (or an explicit path), then
//! overridden by `ENCORE_CMS_URL` and `ENCORE_CMS_TOKEN`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::locale::LocaleConfig;
use crate::render::RenderSettings;

pub const ENV_CMS_URL: &str = "ENCORE_CMS_URL";
pub const ENV_CMS_TOKEN: &str = "ENCORE_CMS_TOKEN";

fn default_base_url() -> String {
    "http://localhost:1337".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// CMS connection settings (the `[cms]` section)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Read-only API token, sent as a bearer token
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CmsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cms: CmsConfig,
    #[serde(default)]
    pub locales: LocaleConfig,
    #[serde(default)]
    pub render: RenderSettings,
}

impl Config {
    /// `~/.config/encore/config.toml` (platform config dir)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("encore").join("config.toml"))
    }

    /// Load configuration and apply environment overrides
    ///
    /// An explicit path must exist. Without one, the default path is used if
    /// present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("parsing config file {:?}", path))
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_CMS_URL).filter(|v| !v.is_empty()) {
            debug!("CMS base URL overridden by {}", ENV_CMS_URL);
            self.cms.base_url = url;
        }
        if let Some(token) = lookup(ENV_CMS_TOKEN).filter(|v| !v.is_empty()) {
            self.cms.api_token = Some(token);
        }
    }
}
