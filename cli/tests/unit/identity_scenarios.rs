//! Startup identity scenarios, from startup decision through the first sync.
//!
//! Runs `prepare_identity` and `run_cycle` against the same in-memory store
//! to check what is persisted at each step.

#![allow(clippy::expect_used)]

use std::cell::Cell;
use std::sync::Arc;

use certwatch_agent::application::ports::ResetConfirmer;
use certwatch_agent::application::services::identity_startup::{
    IdentityOutcome, prepare_identity,
};
use certwatch_agent::application::services::sync_cycle::run_cycle;
use certwatch_agent::application::state::AgentState;
use certwatch_agent::domain::{IdentityError, ResetOutcome, ResetPlan, StateError};

use crate::mocks::{Call, MemoryStore, ScriptedClient, report};

// ── Mock: operator answer ─────────────────────────────────────────────────────

struct Operator {
    approve: bool,
    asked: Cell<u32>,
}

impl Operator {
    fn approving() -> Self {
        Self {
            approve: true,
            asked: Cell::new(0),
        }
    }

    fn declining() -> Self {
        Self {
            approve: false,
            asked: Cell::new(0),
        }
    }
}

impl ResetConfirmer for Operator {
    fn confirm_reset(&self, _plan: &ResetPlan) -> anyhow::Result<bool> {
        self.asked.set(self.asked.get() + 1);
        Ok(self.approve)
    }
}

fn started(store: &MemoryStore) -> AgentState<MemoryStore> {
    let state = AgentState::new(store.clone());
    state.load().expect("load");
    state
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn no_prior_state_proceeds_as_first_run() {
    let store = MemoryStore::new(None);
    let state = started(&store);
    let operator = Operator::approving();

    let outcome = prepare_identity(&state, "prod-1", false, &operator).expect("proceed");

    assert_eq!(outcome, IdentityOutcome::FirstRun);
    assert!(!state.has_state());
    assert_eq!(operator.asked.get(), 0);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn unchanged_name_proceeds() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);

    let outcome =
        prepare_identity(&state, "prod-1", false, &Operator::declining()).expect("proceed");

    assert_eq!(outcome, IdentityOutcome::Unchanged);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn changed_name_is_refused_with_both_names() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);

    let err = prepare_identity(&state, "prod-2", false, &Operator::approving())
        .expect_err("drift refused");

    let message = err.to_string();
    assert!(message.contains("prod-1"), "message: {message}");
    assert!(message.contains("prod-2"), "message: {message}");
    assert_eq!(store.save_count(), 0);
}

#[test]
fn capitalization_change_counts_as_drift() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);

    let err = prepare_identity(&state, "Prod-1", false, &Operator::approving())
        .expect_err("drift refused");

    assert!(matches!(err, IdentityError::Drift { .. }));
}

#[test]
fn confirmed_reset_is_persisted_before_monitoring() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);
    let operator = Operator::approving();

    let outcome = prepare_identity(&state, "prod-2", true, &operator).expect("reset");

    assert_eq!(
        outcome,
        IdentityOutcome::Reset(ResetOutcome {
            migrating_from: Some("A1".to_string())
        })
    );
    assert_eq!(operator.asked.get(), 1);
    let record = store.stored().expect("saved");
    assert_eq!(record.agent_id, "");
    assert_eq!(record.previous_agent_id, "A1");
    assert!(record.last_updated.is_some());
}

#[test]
fn declined_reset_leaves_store_untouched() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);

    let err =
        prepare_identity(&state, "prod-2", true, &Operator::declining()).expect_err("canceled");

    assert!(matches!(err, IdentityError::ResetCanceled));
    assert_eq!(store.save_count(), 0);
    assert_eq!(state.agent_id(), "A1");
}

#[test]
fn reset_that_cannot_be_saved_is_fatal_and_rolled_back() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);
    store.fail_saves(true);

    let err =
        prepare_identity(&state, "prod-2", true, &Operator::approving()).expect_err("fatal");

    assert!(matches!(
        err,
        IdentityError::ResetNotPersisted(StateError::Persist { .. })
    ));
    assert_eq!(state.agent_id(), "A1", "memory must agree with disk");
    assert_eq!(state.previous_agent_id(), "");
}

#[test]
fn reset_without_prior_state_is_accepted() {
    let store = MemoryStore::new(None);
    let state = started(&store);
    let operator = Operator::approving();

    let outcome = prepare_identity(&state, "prod-1", true, &operator).expect("proceed");

    assert_eq!(outcome, IdentityOutcome::FirstRun);
    assert_eq!(operator.asked.get(), 0);
    assert!(store.stored().is_none());
}

#[test]
fn reset_on_unchanged_name_still_reregisters() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);

    let outcome =
        prepare_identity(&state, "prod-1", true, &Operator::approving()).expect("reset");

    assert!(matches!(outcome, IdentityOutcome::Reset(_)));
    assert_eq!(store.stored().expect("saved").previous_agent_id, "A1");
}

#[tokio::test]
async fn reset_then_first_cycle_migrates_to_new_identity() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = Arc::new(started(&store));
    prepare_identity(&state, "prod-2", true, &Operator::approving()).expect("reset");

    let client = ScriptedClient::assigning(&["B2"]);
    run_cycle(&state, &client, &report("prod-2"))
        .await
        .expect("cycle");

    assert_eq!(
        client.calls()[..2],
        [
            Call::Register("prod-2".to_string()),
            Call::Migrate {
                from: "A1".to_string(),
                to: "B2".to_string()
            },
        ]
    );

    // A restart with the new name is now stable.
    let restarted = started(&store);
    assert_eq!(restarted.agent_id(), "B2");
    assert_eq!(restarted.previous_agent_id(), "");
    let outcome =
        prepare_identity(&restarted, "prod-2", false, &Operator::declining()).expect("proceed");
    assert_eq!(outcome, IdentityOutcome::Unchanged);
}

#[test]
fn restart_mid_migration_keeps_marker_and_name() {
    let store = MemoryStore::with_identity("A1", "prod-1");
    let state = started(&store);
    prepare_identity(&state, "prod-2", true, &Operator::approving()).expect("reset");

    // The stored name is still the old one until registration succeeds, so
    // restarting with the new name needs the reset flag again.
    let restarted = started(&store);
    assert_eq!(restarted.previous_agent_id(), "A1");
    assert!(restarted.has_name_changed("prod-2"));

    prepare_identity(&restarted, "prod-2", true, &Operator::approving()).expect("reset again");
    let record = store.stored().expect("saved");
    assert_eq!(record.agent_id, "");
    assert_eq!(record.previous_agent_id, "A1", "pending marker is kept");
}
