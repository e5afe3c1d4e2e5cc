//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;
use crate::infra::config::resolve_config_path;

/// CertWatch Agent - monitors certificates and reports to CertWatch
#[derive(Parser)]
#[command(
    name = "cw-agent",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Config file (default: $CW_AGENT_CONFIG or ./certwatch.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Skip confirmation prompts (for CI/automation)
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log agent activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the monitoring agent
    Start(commands::start::StartArgs),

    /// Validate the configuration file
    Validate,

    /// Inspect or remove the stored agent identity
    #[command(subcommand)]
    State(commands::state::StateCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            config,
            yes,
            quiet,
            no_color,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { yes },
        });
        let config_path = resolve_config_path(config.as_deref());

        match command {
            Command::Start(args) => commands::start::run(&args, &app, &config_path).await,
            Command::Validate => commands::validate::run(&app, &config_path),
            Command::State(cmd) => commands::state::run(&app, &cmd, &config_path),
            Command::Version => {
                commands::version::run(&app.output);
                Ok(())
            }
        }
    }
}
