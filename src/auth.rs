//! Signed-in identity and its on-disk session.
//!
//! The OAuth handshake itself happens outside this tool; `login` records the
//! identity a provider handed back so remote operations can use it.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    GitHub,
}

impl AuthProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            AuthProvider::Google => "Google",
            AuthProvider::GitHub => "GitHub",
        }
    }
}

impl fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for AuthProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(AuthProvider::Google),
            "github" => Ok(AuthProvider::GitHub),
            other => Err(format!(
                "unknown provider '{}' (expected google or github)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub provider: AuthProvider,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Sent as a bearer token to the remote store.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Identity {
    pub fn new(provider: AuthProvider, uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            provider,
            display_name: None,
            email: None,
            access_token: None,
        }
    }

    /// Best human-readable name for status lines.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Persists the signed-in identity between runs.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    pub fn load(&self) -> Result<Option<Identity>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).context("Failed to read session file")?;
        let identity =
            serde_json::from_str(&content).context("Failed to parse session file")?;
        debug!("Loaded session from {}", self.path.display());
        Ok(Some(identity))
    }

    pub fn save(&self, identity: &Identity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let content = serde_json::to_string_pretty(identity).context("Failed to serialize session")?;
        fs::write(&self.path, content).context("Failed to write session file")?;
        info!("Signed in as {} via {}", identity.uid, identity.provider);
        Ok(())
    }

    /// Returns whether a session existed.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to delete session file")?;
        info!("Signed out");
        Ok(true)
    }
}
