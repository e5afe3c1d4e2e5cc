//! Agent identity record and the identity lifecycle policy.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! All functions take data in and return data out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved file name of the identity state file, placed next to the config.
pub const STATE_FILE_NAME: &str = ".certwatch-state.json";

/// Durable agent identity persisted to `<config dir>/.certwatch-state.json`.
///
/// String fields default to empty so that partially written documents from
/// older agents still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Server-assigned agent identifier. Empty until the first registration.
    #[serde(default)]
    pub agent_id: String,
    /// Operator-configured agent name recorded at registration.
    #[serde(default)]
    pub agent_name: String,
    /// Identifier being replaced by a reset, pending server-side migration.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub previous_agent_id: String,
    /// Most recent successful sync with the CertWatch service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Stamped on every save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl IdentityRecord {
    /// Returns `true` when any identity has ever been recorded.
    #[must_use]
    pub fn has_state(&self) -> bool {
        !self.agent_id.is_empty() || !self.agent_name.is_empty()
    }

    /// Returns `true` when a stored name exists and differs from `configured`.
    ///
    /// Comparison is exact: a capitalization-only change counts as a change.
    #[must_use]
    pub fn has_name_changed(&self, configured: &str) -> bool {
        !self.agent_name.is_empty() && self.agent_name != configured
    }

    /// Returns `true` when a reset left a migration pending.
    #[must_use]
    pub fn is_migration_pending(&self) -> bool {
        !self.previous_agent_id.is_empty()
    }
}

/// Next `last_updated` stamp: never earlier than the previous stamp.
#[must_use]
pub fn next_update_stamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if prev > now => prev,
        _ => now,
    }
}

// ── Lifecycle policy ──────────────────────────────────────────────────────────

/// Stored name and identifier versus the name now in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDrift {
    pub previous_name: String,
    pub previous_agent_id: String,
    pub configured_name: String,
}

/// Classification of the stored identity against the configured name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    /// Nothing has been recorded yet.
    Unregistered,
    /// The stored name matches the configured one (or no name was stored).
    Stable,
    /// The configured name differs from the stored name.
    Drifted(IdentityDrift),
}

/// What the reset is about to do, rendered to the operator before confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPlan {
    pub previous_name: String,
    pub previous_agent_id: String,
    pub configured_name: String,
}

/// Startup decision taken once, before any worker starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupDecision {
    /// Continue with the stored identity (or register on first sync).
    Proceed(IdentityStatus),
    /// Refuse to start: the operator must either revert the config or reset.
    Refuse(IdentityDrift),
    /// Confirm with the operator, then apply the reset and continue.
    Reset(ResetPlan),
}

/// Side effects of an applied reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    /// Identifier whose certificates will be migrated on the next sync.
    pub migrating_from: Option<String>,
}

/// Classify `record` against the configured agent name.
#[must_use]
pub fn classify(record: &IdentityRecord, configured_name: &str) -> IdentityStatus {
    if !record.has_state() {
        return IdentityStatus::Unregistered;
    }
    if record.has_name_changed(configured_name) {
        return IdentityStatus::Drifted(IdentityDrift {
            previous_name: record.agent_name.clone(),
            previous_agent_id: record.agent_id.clone(),
            configured_name: configured_name.to_string(),
        });
    }
    IdentityStatus::Stable
}

/// Decide how startup continues.
///
/// A reset request always short-circuits drift refusal. A reset with nothing
/// stored is accepted and has no effect.
#[must_use]
pub fn decide_startup(
    record: &IdentityRecord,
    configured_name: &str,
    reset_requested: bool,
) -> StartupDecision {
    if reset_requested {
        if record.has_state() {
            return StartupDecision::Reset(ResetPlan {
                previous_name: record.agent_name.clone(),
                previous_agent_id: record.agent_id.clone(),
                configured_name: configured_name.to_string(),
            });
        }
        return StartupDecision::Proceed(IdentityStatus::Unregistered);
    }
    match classify(record, configured_name) {
        IdentityStatus::Drifted(drift) => StartupDecision::Refuse(drift),
        status => StartupDecision::Proceed(status),
    }
}

/// Apply the reset side effects to `record` in place.
///
/// The current identifier becomes the migration marker and is cleared so the
/// next sync registers a fresh agent. When the identifier is already empty
/// (an earlier reset never reached registration) the existing marker is kept.
pub fn apply_reset(record: &mut IdentityRecord) -> ResetOutcome {
    if !record.agent_id.is_empty() {
        record.previous_agent_id = std::mem::take(&mut record.agent_id);
    }
    ResetOutcome {
        migrating_from: record
            .is_migration_pending()
            .then(|| record.previous_agent_id.clone()),
    }
}
