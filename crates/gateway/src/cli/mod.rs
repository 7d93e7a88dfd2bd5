pub mod config;
pub mod doctor;

use anyhow::Context;
use clap::{Parser, Subcommand};

/// healthcheckd — an in-process periodic health-check scheduler.
#[derive(Debug, Parser)]
#[command(name = "healthcheckd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the scheduler and HTTP front-end (default when no
    /// subcommand is given).
    Serve,
    /// Validate the configured checks without starting the scheduler.
    Doctor,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

/// Load the configuration from the path specified by `HC_CONFIG` (or
/// `config.toml` by default). Returns the parsed `Config` and the path
/// that was used.
pub fn load_config() -> anyhow::Result<(hc_domain::config::Config, String)> {
    let config_path = std::env::var("HC_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(hc_domain::Error::Io)
            .with_context(|| format!("reading {config_path}"))?;
        toml::from_str(&raw)
            .map_err(|e| hc_domain::Error::Config(format!("parsing {config_path}: {e}")))
            .context("loading config")?
    } else {
        hc_domain::config::Config::default()
    };

    Ok((config, config_path))
}
