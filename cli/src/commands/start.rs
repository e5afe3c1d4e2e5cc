//! `cw-agent start`: check the agent identity, then run the sync worker.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize as _;
use tokio::sync::watch;

use crate::app::AppContext;
use crate::application::ports::{IdentityStore, SyncReport};
use crate::application::services::identity_startup::{IdentityOutcome, prepare_identity};
use crate::application::services::runtime::{self, RuntimeSettings};
use crate::application::state::AgentState;
use crate::domain::{AgentConfig, IdentityError, validate_config};
use crate::infra::api::HttpSyncClient;
use crate::infra::config::YamlConfigStore;
use crate::infra::signal::watch_shutdown_signals;
use crate::infra::state::StateFile;
use crate::output::{OutputContext, truncate_id};

/// Arguments for the start command.
#[derive(Args, Default)]
pub struct StartArgs {
    /// Reset agent state and re-register (migrates matching certs, orphans the rest)
    #[arg(long)]
    pub reset_agent: bool,
}

/// Run `cw-agent start`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the agent name changed
/// without `--reset-agent`, or a confirmed reset could not be saved.
pub async fn run(args: &StartArgs, app: &AppContext, config_path: &Path) -> Result<()> {
    let config = load_valid_config(app, config_path)?;

    let state = Arc::new(AgentState::new(StateFile::for_config(config_path)));
    let loader = Arc::clone(&state);
    let loaded = tokio::task::spawn_blocking(move || loader.load())
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?;
    if let Err(err) = loaded {
        app.output.warn(&err.to_string());
    }

    // The reset prompt and its save both block; keep them off the async workers.
    tokio::task::block_in_place(|| preflight(args, app, &state, &config))?;
    print_summary(&app.output, &state, &config);

    let client = HttpSyncClient::new(&config.api.endpoint, &config.api.key);
    let settings = RuntimeSettings {
        sync_interval: config.agent.sync_interval(),
        report: SyncReport {
            agent_name: config.agent.name.clone(),
            certificates: config.certificates.clone(),
        },
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher = tokio::spawn(watch_shutdown_signals(shutdown_tx));
    let summary = runtime::run(Arc::clone(&state), &client, &settings, shutdown_rx).await;

    if let Ok(signal) = watcher.await {
        println!();
        app.output.warn(&format!("Received {signal}, shutting down..."));
    }
    tracing::info!(cycles = summary.cycles, failures = summary.failures, "agent stopped");
    app.output.info("Agent stopped gracefully");
    Ok(())
}

/// Load and validate the config, printing a styled error on failure.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or fails validation.
pub fn load_valid_config(app: &AppContext, config_path: &Path) -> Result<AgentConfig> {
    let config = YamlConfigStore::new(config_path.to_path_buf())
        .load()
        .inspect_err(|e| app.output.error(&format!("Failed to load configuration: {e:#}")))
        .context("failed to load configuration")?;
    validate_config(&config)
        .inspect_err(|e| app.output.error(&format!("Invalid configuration: {e}")))
        .context("invalid configuration")?;
    Ok(config)
}

/// Resolve the identity before any worker starts.
fn preflight<S: IdentityStore>(
    args: &StartArgs,
    app: &AppContext,
    state: &AgentState<S>,
    config: &AgentConfig,
) -> Result<()> {
    match prepare_identity(state, &config.agent.name, args.reset_agent, app) {
        Ok(IdentityOutcome::Reset(outcome)) => {
            app.output.success("Agent state reset");
            if let Some(previous) = outcome.migrating_from {
                app.output.info(&format!(
                    "Certificates of {} will migrate on next sync",
                    truncate_id(&previous)
                ));
            }
            app.output.info("Starting with new agent...");
            Ok(())
        }
        Ok(IdentityOutcome::FirstRun | IdentityOutcome::Unchanged) => Ok(()),
        Err(err) => {
            match &err {
                IdentityError::Drift {
                    previous_name,
                    previous_agent_id,
                    configured_name,
                } => {
                    print_drift(&app.output, previous_name, previous_agent_id, configured_name);
                    app.output.info("Exiting. No changes made.");
                }
                IdentityError::ResetCanceled => app.output.warn("Reset canceled by user"),
                IdentityError::ResetNotPersisted(source) => {
                    app.output.error(&format!("Failed to save state: {source}"));
                }
            }
            Err(err.into())
        }
    }
}

fn print_drift(ctx: &OutputContext, previous_name: &str, previous_id: &str, configured_name: &str) {
    let reset_cmd = "cw-agent start -c <config> --reset-agent";
    let lines = vec![
        String::new(),
        format!("  Previous: {previous_name:?} ({})", truncate_id(previous_id)),
        format!("  New:      {configured_name:?}"),
        String::new(),
        "  Certificates from the old agent will NOT be".to_string(),
        "  automatically transferred.".to_string(),
        String::new(),
        "  Options:".to_string(),
        "  1. Continue with new name (migrates matching certs):".to_string(),
        format!("     {reset_cmd}"),
        String::new(),
        "  2. Keep existing agent (revert config):".to_string(),
        format!("     Edit config: agent.name = {previous_name:?}"),
        String::new(),
    ];
    ctx.warning_box("Agent Name Changed", &lines);
}

fn print_summary<S: IdentityStore>(ctx: &OutputContext, state: &AgentState<S>, config: &AgentConfig) {
    if ctx.quiet {
        return;
    }
    println!();
    ctx.header("CertWatch Agent");
    ctx.kv("Name", &config.agent.name);
    let agent_id = state.agent_id();
    if agent_id.is_empty() {
        ctx.kv("Agent ID", &"registers on first sync".style(ctx.styles.dim).to_string());
    } else {
        ctx.kv("Agent ID", &truncate_id(&agent_id));
    }
    ctx.kv("Certificates", &config.certificates.len().to_string());
    ctx.kv("Sync", &format!("every {}s", config.agent.sync_interval));
    println!();
    ctx.success("Agent started");
}
