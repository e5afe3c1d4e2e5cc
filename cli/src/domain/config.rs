//! Domain types and validators for the agent configuration file.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_API_ENDPOINT: &str = "https://api.certwatch.app";
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;
pub const MIN_SYNC_INTERVAL_SECS: u64 = 30;
pub const MIN_SCAN_INTERVAL_SECS: u64 = 10;
pub const MAX_AGENT_NAME_LEN: usize = 63;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `certwatch.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AgentConfig {
    /// CertWatch API settings.
    pub api: ApiConfig,
    /// Agent settings.
    pub agent: AgentSettings,
    /// Certificates to monitor.
    pub certificates: Vec<CertificateTarget>,
}

/// CertWatch API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub key: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            key: String::new(),
        }
    }
}

/// Agent identity and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Human-readable agent name, compared against the stored identity.
    #[serde(default)]
    pub name: String,
    /// Seconds between syncs with the CertWatch service.
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u64,
    /// Seconds between certificate scans. Validated and reported by
    /// `validate`; the agent itself does not scan.
    #[serde(default = "default_scan_interval")]
    pub scan_interval: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            sync_interval: default_sync_interval(),
            scan_interval: default_scan_interval(),
        }
    }
}

impl AgentSettings {
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval)
    }
}

/// One monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateTarget {
    pub hostname: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl CertificateTarget {
    /// `hostname:port` form used in logs and duplicate detection.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.hostname, self.port)
    }
}

fn default_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_sync_interval() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}

fn default_port() -> u16 {
    443
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a loaded configuration, returning the first problem found.
///
/// # Errors
///
/// Returns a [`ConfigError`] describing the first invalid setting.
pub fn validate_config(config: &AgentConfig) -> Result<(), ConfigError> {
    if !config.api.endpoint.starts_with("https://") && !config.api.endpoint.starts_with("http://")
    {
        return Err(ConfigError::InvalidEndpoint(config.api.endpoint.clone()));
    }
    if config.api.key.trim().is_empty() {
        return Err(ConfigError::MissingApiKey);
    }

    let name = &config.agent.name;
    if name.trim().is_empty() {
        return Err(ConfigError::MissingAgentName);
    }
    if name.chars().count() > MAX_AGENT_NAME_LEN {
        return Err(ConfigError::AgentNameTooLong(name.clone()));
    }

    check_interval("sync_interval", config.agent.sync_interval, MIN_SYNC_INTERVAL_SECS)?;
    check_interval("scan_interval", config.agent.scan_interval, MIN_SCAN_INTERVAL_SECS)?;

    if config.certificates.is_empty() {
        return Err(ConfigError::NoCertificates);
    }
    let mut seen = HashSet::new();
    for (idx, cert) in config.certificates.iter().enumerate() {
        if cert.hostname.trim().is_empty() {
            return Err(ConfigError::MissingHostname(idx));
        }
        if cert.port == 0 {
            return Err(ConfigError::InvalidPort(idx));
        }
        if !seen.insert(cert.address()) {
            return Err(ConfigError::DuplicateCertificate(cert.address()));
        }
    }
    Ok(())
}

fn check_interval(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::IntervalTooShort { field, min, value });
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
