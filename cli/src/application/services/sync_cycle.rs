//! Application service: one sync cycle with the CertWatch service.
//!
//! Owns the identity bookkeeping around the remote calls: register when no
//! agent id is stored, consume the migration marker left by a reset, and
//! record the sync time. Remote failures end the cycle early; save failures
//! are logged and retried on the next cycle.

use std::sync::Arc;

use chrono::Utc;

use crate::application::ports::{IdentityStore, SyncClient, SyncReport};
use crate::application::state::AgentState;
use crate::domain::SyncError;

/// What a completed cycle changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Agent id assigned by a registration in this cycle.
    pub registered: Option<String>,
    /// Certificates moved from the previous agent in this cycle.
    pub migrated: Option<usize>,
    /// `false` when at least one save failed; memory is ahead of disk.
    pub persisted: bool,
}

/// Run one register → migrate → sync cycle.
///
/// # Errors
///
/// Returns the [`SyncError`] of the registration or sync call. A failed
/// migration is logged and left pending instead.
pub async fn run_cycle<S, C>(
    state: &Arc<AgentState<S>>,
    client: &C,
    report: &SyncReport,
) -> Result<CycleReport, SyncError>
where
    S: IdentityStore + 'static,
    C: SyncClient,
{
    let mut cycle = CycleReport {
        persisted: true,
        ..CycleReport::default()
    };

    let mut agent_id = state.agent_id();
    if agent_id.is_empty() {
        let registration = client.register(&report.agent_name).await?;
        agent_id = registration.agent_id;
        state.set_agent_id(agent_id.clone());
        state.set_agent_name(report.agent_name.clone());
        if state.previous_agent_id() == agent_id {
            state.clear_previous_agent_id();
        }
        tracing::info!(agent_id = %agent_id, name = %report.agent_name, "agent registered");
        cycle.persisted &= persist(state, "registration").await;
        cycle.registered = Some(agent_id.clone());
    }

    let previous = state.previous_agent_id();
    if !previous.is_empty() {
        match client.migrate(&previous, &agent_id).await {
            Ok(migration) => {
                state.clear_previous_agent_id();
                tracing::info!(from = %previous, to = %agent_id, migrated = migration.migrated, "certificates migrated");
                cycle.persisted &= persist(state, "migration").await;
                cycle.migrated = Some(migration.migrated);
            }
            Err(err) => {
                tracing::warn!(from = %previous, error = %err, "certificate migration failed, will retry");
            }
        }
    }

    client.sync(&agent_id, report).await?;
    state.set_last_sync_at(Utc::now());
    if state.fill_agent_name(&report.agent_name) {
        tracing::info!(agent_id = %agent_id, name = %report.agent_name, "recorded agent name");
    }
    cycle.persisted &= persist(state, "sync").await;
    tracing::debug!(agent_id = %agent_id, certificates = report.certificates.len(), "sync complete");

    Ok(cycle)
}

async fn persist<S: IdentityStore + 'static>(state: &Arc<AgentState<S>>, step: &'static str) -> bool {
    let state = Arc::clone(state);
    match tokio::task::spawn_blocking(move || state.save()).await {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::warn!(step, error = %err, "saving agent state failed, will retry next cycle");
            false
        }
        Err(err) => {
            tracing::warn!(step, error = %err, "state save task panicked");
            false
        }
    }
}
