//! User configuration, read from `config.toml`.
//!
//! ```toml
//! mode = "remote"
//! export_file = "code-snippets.json"
//!
//! [remote]
//! base_url = "https://snippets.example.com/v1"
//! collection = "snippets"
//! ```

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::EXPORT_FILE_NAME;
use crate::store::{LocalStore, RemoteStore, SnippetStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub collection: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            collection: "snippets".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: StoreMode,
    pub data_dir: Option<PathBuf>,
    pub export_file: String,
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: StoreMode::Local,
            data_dir: None,
            export_file: EXPORT_FILE_NAME.to_string(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Config {
    /// `<platform config dir>/snipvault/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("snipvault").join("config.toml"))
    }

    /// Loads `path`, or the default location when `None`. A missing file
    /// gives the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => LocalStore::default_data_dir(),
        }
    }

    /// Builds the store adapter for the configured mode.
    pub fn build_store(&self) -> Result<Box<dyn SnippetStore>> {
        match self.mode {
            StoreMode::Local => Ok(Box::new(LocalStore::new(self.data_dir()?))),
            StoreMode::Remote => {
                let Some(base_url) = self.remote.base_url.as_deref() else {
                    bail!("Remote mode needs `remote.base_url` in the config file");
                };
                Ok(Box::new(RemoteStore::new(
                    base_url,
                    self.remote.collection.as_str(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Persistence;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_parse_remote_config() {
        let config = Config::parse(
            r#"
            mode = "remote"
            export_file = "mine.json"

            [remote]
            base_url = "https://snippets.example.com/v1"
            "#,
        )
        .unwrap();
        assert_eq!(config.mode, StoreMode::Remote);
        assert_eq!(config.export_file, "mine.json");
        assert_eq!(config.remote.collection, "snippets");
        assert_eq!(
            config.build_store().unwrap().persistence(),
            Persistence::PerRecord
        );
    }

    #[test]
    fn test_remote_without_url_is_an_error() {
        let config = Config {
            mode: StoreMode::Remote,
            ..Config::default()
        };
        assert!(config.build_store().is_err());
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Config::parse(r#"mode = "cloud""#).is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(temp.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_local_store_uses_data_dir() {
        let temp = TempDir::new().unwrap();
        let config = Config {
            data_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };
        assert_eq!(config.data_dir().unwrap(), temp.path());
        assert_eq!(
            config.build_store().unwrap().persistence(),
            Persistence::Snapshot
        );
    }
}
