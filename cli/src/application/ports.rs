//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{CertificateTarget, IdentityRecord, ResetPlan, StateError, SyncError};

// ── Persistence Port ──────────────────────────────────────────────────────────

/// Durable storage for the identity record.
///
/// Implementations classify every failure into a [`StateError`]; absence of
/// the backing file is reported as `Ok(None)`, never as an error.
pub trait IdentityStore: Send + Sync {
    /// Location of the backing file.
    fn path(&self) -> &Path;
    /// Read the stored record, or `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<IdentityRecord>, StateError>;
    /// Atomically replace the stored record.
    fn save(&self, record: &IdentityRecord) -> Result<(), StateError>;
    /// Delete the backing file. A missing file is success.
    fn purge(&self) -> Result<(), StateError>;
}

// ── Operator Port ─────────────────────────────────────────────────────────────

/// Asks the operator to approve an identity reset.
pub trait ResetConfirmer {
    /// Returns `true` when the reset may proceed.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown (e.g. no TTY).
    fn confirm_reset(&self, plan: &ResetPlan) -> Result<bool>;
}

// ── Remote Service Port ───────────────────────────────────────────────────────

/// Result of registering a new agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub agent_id: String,
}

/// Result of moving certificates from a replaced agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    #[serde(default)]
    pub migrated: usize,
}

/// Payload of a routine sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub agent_name: String,
    pub certificates: Vec<CertificateTarget>,
}

/// Calls the CertWatch service makes available to the agent.
#[allow(async_fn_in_trait)]
pub trait SyncClient {
    /// Register a new agent under `name`.
    async fn register(&self, name: &str) -> Result<Registration, SyncError>;
    /// Move certificates owned by `from` to `to`.
    async fn migrate(&self, from: &str, to: &str) -> Result<Migration, SyncError>;
    /// Report the current certificate set for `agent_id`.
    async fn sync(&self, agent_id: &str, report: &SyncReport) -> Result<(), SyncError>;
}
