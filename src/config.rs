use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{klog_debug, Error, Result};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const BACKEND_URL_ENV: &str = "KANBAN_BACKEND_URL";

/// What to do with an optimistic drop when the server rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PersistFailurePolicy {
    /// Put the task back where the drag started.
    #[default]
    Rollback,
    /// Leave the optimistic placement and only report the error.
    Keep,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub on_persist_failure: PersistFailurePolicy,
    /// Seconds between background board refreshes, 0 disables them.
    #[serde(default)]
    pub auto_refresh_secs: u64,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_timeout_secs(),
            on_persist_failure: PersistFailurePolicy::default(),
            auto_refresh_secs: 0,
        }
    }
}

impl Config {
    pub fn kanban_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".kanban"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::kanban_dir()?.join("kanban.toml"))
    }

    pub fn credentials_path() -> Result<PathBuf> {
        Ok(Self::kanban_dir()?.join("session.json"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn auto_refresh(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }

    /// Load `~/.kanban/kanban.toml`, then apply `KANBAN_BACKEND_URL`.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                klog_debug!("Config: backend_url overridden by {}", BACKEND_URL_ENV);
                config.backend_url = url;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        klog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            klog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        klog_debug!(
            "Config loaded: backend_url={}, timeout={}s, on_persist_failure={:?}, auto_refresh={}s",
            config.backend_url,
            config.request_timeout_secs,
            config.on_persist_failure,
            config.auto_refresh_secs
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                klog_debug!("Creating config directory: {}", dir.display());
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        klog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
