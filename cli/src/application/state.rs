//! `AgentState`: the shared, lock-guarded identity record.
//!
//! Every worker holds an `Arc<AgentState>`. Field accessors and mutators only
//! touch memory; `load`, `save` and the reset operations additionally perform
//! one file operation while the lock is held, so a reader never observes a
//! half-applied load or save.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::application::ports::IdentityStore;
use crate::domain::identity::{self, IdentityRecord, ResetOutcome};
use crate::domain::StateError;

/// In-memory identity record backed by an [`IdentityStore`].
pub struct AgentState<S> {
    store: S,
    record: Mutex<IdentityRecord>,
}

impl<S: IdentityStore> AgentState<S> {
    /// Wrap `store` with an empty, not yet loaded record.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            record: Mutex::new(IdentityRecord::default()),
        }
    }

    /// Location of the backing state file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        self.store.path()
    }

    fn lock(&self) -> MutexGuard<'_, IdentityRecord> {
        // The record is plain data; a panic elsewhere cannot leave it torn.
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    /// Replace the in-memory record with the stored one.
    ///
    /// A missing file yields an empty record and `Ok(())`. A migration
    /// marker pointing at the current agent id is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Corrupted`] or [`StateError::Unreadable`] when the
    /// file cannot be used. The in-memory record is empty in that case and
    /// the caller should only warn.
    pub fn load(&self) -> Result<(), StateError> {
        let mut record = self.lock();
        match self.store.load() {
            Ok(Some(mut stored)) => {
                tracing::debug!(path = %self.file_path().display(), agent_id = %stored.agent_id, "agent state loaded");
                if stored.is_migration_pending() && stored.previous_agent_id == stored.agent_id {
                    tracing::warn!(agent_id = %stored.agent_id, "migration marker equals current agent id, dropping it");
                    stored.previous_agent_id.clear();
                }
                *record = stored;
                Ok(())
            }
            Ok(None) => {
                tracing::debug!(path = %self.file_path().display(), "no agent state, first run");
                *record = IdentityRecord::default();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %self.file_path().display(), error = %err, "agent state unusable, treating as first run");
                *record = IdentityRecord::default();
                Err(err)
            }
        }
    }

    /// Persist the current record, stamping `last_updated`.
    ///
    /// The stamp is never earlier than the previous one and is only kept in
    /// memory once the write succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Persist`] or [`StateError::Serialize`] when the
    /// file could not be written; the previous file is left intact.
    pub fn save(&self) -> Result<(), StateError> {
        let mut record = self.lock();
        Self::save_locked(&self.store, &mut record)
    }

    fn save_locked(store: &S, record: &mut IdentityRecord) -> Result<(), StateError> {
        let mut stamped = record.clone();
        stamped.last_updated = Some(identity::next_update_stamp(record.last_updated, Utc::now()));
        store.save(&stamped)?;
        tracing::debug!(path = %store.path().display(), agent_id = %stamped.agent_id, "agent state saved");
        *record = stamped;
        Ok(())
    }

    /// Clear every field and delete the backing file.
    ///
    /// Memory is cleared even when the file cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Purge`] if the file exists but cannot be removed.
    pub fn reset(&self) -> Result<(), StateError> {
        let mut record = self.lock();
        *record = IdentityRecord::default();
        self.store.purge()?;
        tracing::info!(path = %self.file_path().display(), "agent state purged");
        Ok(())
    }

    /// Apply the identity reset and persist it in one locked step.
    ///
    /// On a failed save the in-memory record is rolled back so memory and
    /// disk keep agreeing.
    ///
    /// # Errors
    ///
    /// Returns the save error; callers must treat it as fatal.
    pub fn reset_identity(&self) -> Result<ResetOutcome, StateError> {
        let mut record = self.lock();
        let before = record.clone();
        let outcome = identity::apply_reset(&mut record);
        if let Err(err) = Self::save_locked(&self.store, &mut record) {
            *record = before;
            return Err(err);
        }
        tracing::info!(
            migrating_from = outcome.migrating_from.as_deref().unwrap_or(""),
            "agent identity reset"
        );
        Ok(outcome)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Copy of the whole record, taken under one lock acquisition.
    #[must_use]
    pub fn snapshot(&self) -> IdentityRecord {
        self.lock().clone()
    }

    #[must_use]
    pub fn agent_id(&self) -> String {
        self.lock().agent_id.clone()
    }

    #[must_use]
    pub fn agent_name(&self) -> String {
        self.lock().agent_name.clone()
    }

    #[must_use]
    pub fn previous_agent_id(&self) -> String {
        self.lock().previous_agent_id.clone()
    }

    #[must_use]
    pub fn last_sync_at(&self) -> Option<DateTime<Utc>> {
        self.lock().last_sync_at
    }

    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.lock().last_updated
    }

    /// `true` when an agent id or name has been recorded.
    #[must_use]
    pub fn has_state(&self) -> bool {
        self.lock().has_state()
    }

    /// `true` when a stored name exists and differs from `configured`.
    #[must_use]
    pub fn has_name_changed(&self, configured: &str) -> bool {
        self.lock().has_name_changed(configured)
    }

    // ── Mutators (memory only) ───────────────────────────────────────────────

    pub fn set_agent_id(&self, id: impl Into<String>) {
        self.lock().agent_id = id.into();
    }

    pub fn set_agent_name(&self, name: impl Into<String>) {
        self.lock().agent_name = name.into();
    }

    pub fn set_previous_agent_id(&self, id: impl Into<String>) {
        self.lock().previous_agent_id = id.into();
    }

    pub fn set_last_sync_at(&self, at: DateTime<Utc>) {
        self.lock().last_sync_at = Some(at);
    }

    /// Set the name only when none is stored yet, in one lock acquisition.
    ///
    /// Returns `true` when the name was written.
    pub fn fill_agent_name(&self, name: &str) -> bool {
        let mut record = self.lock();
        if !record.agent_name.is_empty() || name.is_empty() {
            return false;
        }
        record.agent_name = name.to_string();
        true
    }

    /// Drop the migration marker once the service confirmed the migration.
    pub fn clear_previous_agent_id(&self) {
        self.lock().previous_agent_id.clear();
    }
}
