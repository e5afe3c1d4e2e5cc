//! `cw-agent validate`: check the configuration without starting the agent.

use std::path::Path;

use anyhow::Result;

use crate::app::AppContext;
use crate::commands::start::load_valid_config;
use crate::domain::config::DEFAULT_API_ENDPOINT;

/// Run `cw-agent validate`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub fn run(app: &AppContext, config_path: &Path) -> Result<()> {
    let ctx = &app.output;
    ctx.header("Config Validation");

    let config = load_valid_config(app, config_path)?;
    ctx.success("Configuration loaded");
    ctx.success("API settings valid");
    ctx.success("Agent settings valid");
    ctx.success(&format!("{} certificates configured", config.certificates.len()));

    if !ctx.quiet {
        println!();
    }
    ctx.header("Summary");
    ctx.kv("Agent", &config.agent.name);
    if config.api.endpoint != DEFAULT_API_ENDPOINT {
        ctx.kv("API Endpoint", &config.api.endpoint);
    }
    ctx.kv("Certificates", &config.certificates.len().to_string());
    ctx.kv("Sync", &format!("every {}s", config.agent.sync_interval));
    ctx.kv("Scan", &format!("every {}s", config.agent.scan_interval));
    if !ctx.quiet {
        println!();
    }
    ctx.success("Configuration is valid!");
    Ok(())
}
