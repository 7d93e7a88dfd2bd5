mod api;
mod bootstrap;
mod checks;
mod cli;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use hc_domain::config::Config;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to serve when no subcommand is given.
        None | Some(Command::Serve) => {
            init_tracing();
            let (config, _config_path) = cli::load_config()?;
            run_server(Arc::new(config)).await
        }
        Some(Command::Doctor) => {
            let (config, config_path) = cli::load_config()?;
            cli::doctor::run(&config, &config_path)
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, _config_path) = cli::load_config()?;
            cli::config::validate(&config)
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _config_path) = cli::load_config()?;
            cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("healthcheckd {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured JSON tracing (only for the `serve` command).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hc_gateway=debug")),
        )
        .json()
        .init();
}

/// Start the scheduler and HTTP front-end with the given configuration.
async fn run_server(config: Arc<Config>) -> anyhow::Result<()> {
    tracing::info!("healthcheckd starting");

    let state = bootstrap::build_app_state(config.clone())
        .await
        .context("building app state")?;
    bootstrap::start_scheduler(&state);

    let app = api::router::build(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    tracing::info!(addr = %addr, "healthcheckd listening");

    axum::serve(listener, app)
        .await
        .context("axum server error")?;

    Ok(())
}
