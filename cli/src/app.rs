//! Application context: unified state passed to every command handler.
//!
//! `AppContext` carries output styling and the confirmation policy so that
//! command handlers never construct their own.

use anyhow::Result;

use crate::application::ports::ResetConfirmer;
use crate::domain::ResetPlan;
use crate::output::{OutputContext, truncate_id};

/// Environment variable that skips confirmation prompts like `--yes`.
pub const YES_ENV: &str = "CW_AGENT_YES";

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Behaviour flags.
pub struct BehaviourFlags {
    /// Skip interactive prompts (also set by `CW_AGENT_YES`).
    pub yes: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Output rendering options.
    pub output: OutputFlags,
    /// Behaviour options.
    pub behaviour: BehaviourFlags,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// When `true`, skip interactive prompts and proceed.
    ///
    /// Only an explicit `--yes` / `-y` or `CW_AGENT_YES` sets this: a CI
    /// environment alone never approves an identity reset.
    pub non_interactive: bool,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: &AppFlags) -> Self {
        let yes_env = std::env::var(YES_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        Self {
            output: OutputContext::new(flags.output.no_color, flags.output.quiet),
            non_interactive: flags.behaviour.yes || yes_env,
        }
    }

    /// Ask the user for confirmation.
    ///
    /// When `non_interactive` is `true`, returns `true` without prompting.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.non_interactive {
            self.output.info("--yes provided, skipping confirmation");
            return Ok(true);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

impl ResetConfirmer for AppContext {
    fn confirm_reset(&self, plan: &ResetPlan) -> Result<bool> {
        let lines = vec![
            String::new(),
            format!(
                "  Previous: {:?} ({})",
                plan.previous_name,
                truncate_id(&plan.previous_agent_id)
            ),
            format!("  New:      {:?}", plan.configured_name),
            String::new(),
            "  On next sync:".to_string(),
            "  • Matching certs will migrate to the new agent".to_string(),
            "  • Non-matching certs will be orphaned".to_string(),
            String::new(),
        ];
        self.output.warning_box("Agent Reset", &lines);
        self.confirm("Continue?")
    }
}
