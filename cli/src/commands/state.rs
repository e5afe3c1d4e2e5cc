//! `cw-agent state`: inspect or remove the stored agent identity.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::app::AppContext;
use crate::application::state::AgentState;
use crate::infra::state::StateFile;
use crate::output::truncate_id;

/// State subcommands.
#[derive(Subcommand)]
pub enum StateCommand {
    /// Show the stored agent identity
    Show(ShowArgs),
    /// Delete the stored agent identity (the next start registers a new agent)
    Reset,
}

/// Arguments for `state show`.
#[derive(Args, Default)]
pub struct ShowArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run a `cw-agent state` subcommand.
///
/// # Errors
///
/// Returns an error if serialization fails, the reset is declined, or the
/// state file cannot be removed.
pub fn run(app: &AppContext, cmd: &StateCommand, config_path: &Path) -> Result<()> {
    let state = AgentState::new(StateFile::for_config(config_path));
    if let Err(err) = state.load() {
        // Keep stdout parseable in JSON mode.
        if matches!(cmd, StateCommand::Show(ShowArgs { json: true })) {
            app.output.error(&err.to_string());
        } else {
            app.output.warn(&err.to_string());
        }
    }
    match cmd {
        StateCommand::Show(args) => show(app, &state, args.json),
        StateCommand::Reset => reset(app, &state),
    }
}

fn show(app: &AppContext, state: &AgentState<StateFile>, json: bool) -> Result<()> {
    let record = state.snapshot();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&record).context("serializing agent state")?
        );
        return Ok(());
    }

    let ctx = &app.output;
    ctx.header("Agent State");
    ctx.kv("File", &state.file_path().display().to_string());
    if !record.has_state() {
        ctx.info("No agent registered yet.");
        return Ok(());
    }
    ctx.kv("Name", &record.agent_name);
    ctx.kv("Agent ID", &truncate_id(&record.agent_id));
    if record.is_migration_pending() {
        ctx.kv("Migrating", &truncate_id(&record.previous_agent_id));
    }
    let fmt_time = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
    };
    ctx.kv("Last sync", &fmt_time(record.last_sync_at));
    ctx.kv("Last updated", &fmt_time(record.last_updated));
    Ok(())
}

fn reset(app: &AppContext, state: &AgentState<StateFile>) -> Result<()> {
    if state.has_state() {
        let record = state.snapshot();
        app.output.warning_box(
            "Remove Agent State",
            &[
                String::new(),
                format!(
                    "  Agent: {:?} ({})",
                    record.agent_name,
                    truncate_id(&record.agent_id)
                ),
                String::new(),
                "  The next start registers a new agent. Certificates".to_string(),
                "  of this agent will NOT be migrated.".to_string(),
                String::new(),
            ],
        );
    }
    let confirmed = app.confirm("Remove agent state?").unwrap_or(false);
    if !confirmed {
        app.output.warn("Reset canceled by user");
        anyhow::bail!("state reset canceled by user");
    }
    state
        .reset()
        .inspect_err(|e| app.output.error(&e.to_string()))?;
    app.output.success("Agent state removed");
    Ok(())
}
