//! Application service: the scheduled sync worker.
//!
//! Runs a sync cycle on every tick until the shutdown channel flips to
//! `true` or its sender is dropped. A cycle in flight always completes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::application::ports::{IdentityStore, SyncClient, SyncReport};
use crate::application::services::sync_cycle;
use crate::application::state::AgentState;

/// Scheduling inputs for [`run`].
pub struct RuntimeSettings {
    /// Time between sync cycles; the first cycle runs immediately.
    pub sync_interval: Duration,
    /// Payload sent on every sync.
    pub report: SyncReport,
}

/// Counters reported when the worker stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeSummary {
    pub cycles: u32,
    pub failures: u32,
}

/// Drive sync cycles until shutdown.
pub async fn run<S, C>(
    state: Arc<AgentState<S>>,
    client: &C,
    settings: &RuntimeSettings,
    mut shutdown: watch::Receiver<bool>,
) -> RuntimeSummary
where
    S: IdentityStore + 'static,
    C: SyncClient,
{
    let mut summary = RuntimeSummary::default();
    if *shutdown.borrow() {
        return summary;
    }

    let mut ticker = tokio::time::interval(settings.sync_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sync_cycle::run_cycle(&state, client, &settings.report).await {
                    Ok(_) => summary.cycles += 1,
                    Err(err) => {
                        summary.failures += 1;
                        tracing::warn!(error = %err, "sync failed, retrying next interval");
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!(cycles = summary.cycles, failures = summary.failures, "sync worker stopping");
                    break;
                }
            }
        }
    }
    summary
}
