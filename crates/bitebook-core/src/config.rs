//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the backend base URL, the credential backend, and the last
//! used role and email.
//!
//! Configuration is stored at `~/.config/bitebook/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{CredentialStore, FileStore, KeyringStore};
use crate::models::Role;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bitebook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither the environment nor the config names one
pub const DEFAULT_API_BASE: &str = "https://backend-env.up.railway.app";

/// Environment variable overriding the backend base URL
pub const API_BASE_ENV: &str = "BITEBOOK_API_BASE";

/// Where the bearer credential is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base: Option<String>,
    #[serde(default)]
    pub credential_backend: CredentialBackend,
    pub last_role: Option<Role>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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

    /// Base URL: `BITEBOOK_API_BASE`, then the config file, then the default.
    pub fn api_base(&self) -> String {
        self.resolve_api_base(std::env::var(API_BASE_ENV).ok())
    }

    fn resolve_api_base(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }

    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        Ok(match self.credential_backend {
            CredentialBackend::File => Arc::new(FileStore::new(self.cache_dir()?)),
            CredentialBackend::Keyring => Arc::new(KeyringStore::new()),
        })
    }
}
