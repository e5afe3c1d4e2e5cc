//! Application service: identity check run once before monitoring starts.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! Rendering and prompting go through the injected `ResetConfirmer`.

use crate::application::ports::{IdentityStore, ResetConfirmer};
use crate::application::state::AgentState;
use crate::domain::identity::{self, IdentityStatus, ResetOutcome, StartupDecision};
use crate::domain::IdentityError;

/// How the stored identity was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityOutcome {
    /// No identity yet; the first sync registers one.
    FirstRun,
    /// The stored identity matches the config.
    Unchanged,
    /// The identity was reset and saved.
    Reset(ResetOutcome),
}

/// Decide, confirm and apply the identity transition for this startup.
///
/// The record is read once, the decision is taken on that snapshot, and a
/// confirmed reset is written in a single locked step.
///
/// # Errors
///
/// - [`IdentityError::Drift`] when the configured name changed and no reset
///   was requested.
/// - [`IdentityError::ResetCanceled`] when the operator declined, or the
///   prompt could not be shown.
/// - [`IdentityError::ResetNotPersisted`] when the reset could not be saved.
pub fn prepare_identity<S: IdentityStore>(
    state: &AgentState<S>,
    configured_name: &str,
    reset_requested: bool,
    confirmer: &impl ResetConfirmer,
) -> Result<IdentityOutcome, IdentityError> {
    let record = state.snapshot();
    match identity::decide_startup(&record, configured_name, reset_requested) {
        StartupDecision::Proceed(IdentityStatus::Unregistered) => {
            if reset_requested {
                tracing::info!("reset requested but no agent state exists, nothing to reset");
            }
            Ok(IdentityOutcome::FirstRun)
        }
        StartupDecision::Proceed(_) => Ok(IdentityOutcome::Unchanged),
        StartupDecision::Refuse(drift) => {
            tracing::warn!(
                previous = %drift.previous_name,
                configured = %drift.configured_name,
                "agent name changed, refusing to start"
            );
            Err(IdentityError::Drift {
                previous_name: drift.previous_name,
                previous_agent_id: drift.previous_agent_id,
                configured_name: drift.configured_name,
            })
        }
        StartupDecision::Reset(plan) => {
            let confirmed = confirmer.confirm_reset(&plan).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "reset confirmation unavailable");
                false
            });
            if !confirmed {
                return Err(IdentityError::ResetCanceled);
            }
            state
                .reset_identity()
                .map(IdentityOutcome::Reset)
                .map_err(IdentityError::ResetNotPersisted)
        }
    }
}
