//! The logged-in session, persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::core::User;
use crate::util::blocking;
use crate::{klog_debug, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.user.is_none()
    }
}

/// `session.json` in the kanban directory.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::credentials_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_sync(&self) -> Result<StoredSession> {
        klog_debug!("CredentialStore::load path={}", self.path.display());
        if !self.path.exists() {
            return Ok(StoredSession::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_sync(&self, session: &StoredSession) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut session = session.clone();
        session.saved_at = Some(Utc::now());

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(&session)?)?;
        fs::rename(&temp_path, &self.path)?;
        klog_debug!("Session saved: {}", self.path.display());
        Ok(())
    }

    pub fn clear_sync(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            klog_debug!("Session cleared: {}", self.path.display());
        }
        Ok(())
    }

    pub async fn load(&self) -> Result<StoredSession> {
        let store = self.clone();
        blocking(move || store.load_sync()).await
    }

    pub async fn save(&self, session: StoredSession) -> Result<()> {
        let store = self.clone();
        blocking(move || store.save_sync(&session)).await
    }

    pub async fn clear(&self) -> Result<()> {
        let store = self.clone();
        blocking(move || store.clear_sync()).await
    }
}
