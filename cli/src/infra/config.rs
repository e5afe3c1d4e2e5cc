//! YAML configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::config::AgentConfig;

/// Environment variable that overrides the default config location.
pub const CONFIG_PATH_ENV: &str = "CW_AGENT_CONFIG";
/// Environment variable that overrides `api.key`.
pub const API_KEY_ENV: &str = "CW_API_KEY";
/// Config file used when neither the flag nor the env var is set.
pub const DEFAULT_CONFIG_FILE: &str = "certwatch.yaml";

/// Resolve the config path: explicit flag, then `CW_AGENT_CONFIG`, then
/// `./certwatch.yaml`.
#[must_use]
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(val) if !val.trim().is_empty() => PathBuf::from(val),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Reads `AgentConfig` from a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the config file; the identity state file lives next to it.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, applying the `CW_API_KEY` override.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, or not valid YAML.
    pub fn load(&self) -> Result<AgentConfig> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("cannot read {}", self.path.display()))?;
        let mut config: AgentConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", self.path.display()))?;
        if let Some(key) = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
        {
            config.api.key = key;
        }
        tracing::debug!(path = %self.path.display(), certificates = config.certificates.len(), "configuration loaded");
        Ok(config)
    }
}
