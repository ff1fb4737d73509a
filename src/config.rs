//! Client configuration.
//!
//! Loaded from `<config dir>/wisdm-central/config.json`, then overridden by
//! environment variables, then by command-line flags:
//!
//! - `WISDM_CENTRAL_URL` - REST root of the host (default: [`DEFAULT_URL`])
//! - `WISDM_CENTRAL_USER` / `WISDM_CENTRAL_APP_PASSWORD` - application password login
//! - `WISDM_CENTRAL_TOKEN` - bearer token (used when no password is set)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

use crate::client::{Auth, DEFAULT_URL};

const APP_NAME: &str = "wisdm-central";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// REST root of the host, e.g. `https://example.com/wp-json`.
    #[serde(default)]
    pub url: Option<String>,
    /// Login name for application-password auth.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub app_password: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl Config {
    /// Load configuration from the user's config directory and the environment.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        let file = match get_config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        };
        file.with_env(|key| std::env::var(key).ok())
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Save to the user's config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("WISDM_CENTRAL_URL") {
            self.url = Some(url);
        }
        if let Some(user) = lookup("WISDM_CENTRAL_USER") {
            self.user = Some(user);
        }
        if let Some(password) = lookup("WISDM_CENTRAL_APP_PASSWORD") {
            self.app_password = Some(password);
        }
        if let Some(token) = lookup("WISDM_CENTRAL_TOKEN") {
            self.token = Some(token);
        }
        self
    }

    pub fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_URL)
    }

    /// Application password wins over a token when both are configured.
    pub fn auth(&self) -> Option<Auth> {
        match (&self.user, &self.app_password, &self.token) {
            (Some(user), Some(password), _) => Some(Auth::AppPassword {
                user: user.clone(),
                password: password.clone(),
            }),
            (_, _, Some(token)) => Some(Auth::Token(token.clone())),
            _ => None,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
