//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, or `std::fs`. All error types implement
//! `thiserror::Error` and convert to `anyhow::Error` via the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

// ── State errors ──────────────────────────────────────────────────────────────

/// Classified failures of the identity state file.
///
/// Raw I/O and JSON errors never leave the persistence layer unwrapped; they
/// are mapped into one of these variants together with the offending path.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State file {} is corrupted, starting as first run: {source}", path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("State file {} cannot be read, starting as first run: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot save state file {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize agent state: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Cannot remove state file {}: {source}", path.display())]
    Purge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StateError {
    /// Returns `true` for load failures that must only be surfaced as a
    /// warning: the in-memory record has already been reset to empty.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Corrupted { .. } | Self::Unreadable { .. })
    }
}

// ── Identity errors ───────────────────────────────────────────────────────────

/// Startup refusals raised by the identity lifecycle policy.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(
        "Agent name changed from '{previous_name}' to '{configured_name}'. \
Use --reset-agent to continue with the new name."
    )]
    Drift {
        previous_name: String,
        previous_agent_id: String,
        configured_name: String,
    },

    #[error("Agent reset canceled by user.")]
    ResetCanceled,

    #[error("Agent reset could not be saved: {0}")]
    ResetNotPersisted(#[source] StateError),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Configuration validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("agent.name is required")]
    MissingAgentName,

    #[error("agent.name '{0}' is longer than 63 characters")]
    AgentNameTooLong(String),

    #[error("api.key is required (set it in the config or CW_API_KEY)")]
    MissingApiKey,

    #[error("api.endpoint '{0}' must start with http:// or https://")]
    InvalidEndpoint(String),

    #[error("agent.{field} must be at least {min} seconds, got {value}")]
    IntervalTooShort {
        field: &'static str,
        min: u64,
        value: u64,
    },

    #[error("at least one certificate must be configured")]
    NoCertificates,

    #[error("certificates[{0}].hostname is required")]
    MissingHostname(usize),

    #[error("certificates[{0}].port must be between 1 and 65535")]
    InvalidPort(usize),

    #[error("certificate {0} is configured more than once")]
    DuplicateCertificate(String),
}

// ── Sync errors ───────────────────────────────────────────────────────────────

/// Failures talking to the remote CertWatch service.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("CertWatch API returned HTTP {status} for {operation}")]
    Status { operation: &'static str, status: u16 },

    #[error("CertWatch API unreachable during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    #[error("Unexpected CertWatch API response for {operation}: {message}")]
    InvalidResponse {
        operation: &'static str,
        message: String,
    },
}
