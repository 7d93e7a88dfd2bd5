//! `AppState` construction and background-task spawning extracted from
//! `main.rs`, shared by the `serve` and `doctor` commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use hc_domain::config::{Config, ConfigSeverity};

use crate::checks::{Check, CheckRegistry, CommandProbe, Scheduler};
use crate::state::AppState;

/// Validate config and build the `CheckRegistry` it describes. Shared
/// by `serve` and `doctor` so the logic lives in one place.
pub fn build_registry(config: &Config) -> anyhow::Result<CheckRegistry> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues
        .iter()
        .any(|i| matches!(i.severity, ConfigSeverity::Error))
    {
        let count = issues
            .iter()
            .filter(|i| matches!(i.severity, ConfigSeverity::Error))
            .count();
        return Err(hc_domain::Error::Config(format!(
            "config validation failed with {count} error(s)"
        ))
        .into());
    }

    let mut registry = CheckRegistry::new();
    for check_config in &config.checks {
        let probe = Arc::new(CommandProbe::from_command_line(
            &check_config.command,
            check_config.capture_stderr,
        ));
        registry.register(Check::new(
            check_config.name.clone(),
            check_config.description.clone(),
            Duration::from_secs(check_config.interval_secs),
            probe,
            config.scheduler.history_capacity,
        ));
    }

    Ok(registry)
}

/// Build a fully-wired `AppState`. Does not start the dispatcher or
/// worker pool — see `start_scheduler` — so `doctor` can validate a
/// config without any background tasks running.
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    let registry = build_registry(&config).context("building check registry")?;
    let checks = registry.into_checks();
    tracing::info!(count = checks.len(), "checks registered");

    let scheduler = Scheduler::new(config.scheduler.global_history_capacity);

    Ok(AppState {
        config,
        scheduler,
        checks: Arc::new(checks),
    })
}

/// Start the dispatcher loop and worker pool, and enroll every check
/// for its first run.
pub fn start_scheduler(state: &AppState) {
    let dispatcher = state.scheduler.clone();
    tokio::spawn(dispatcher.run_forever());

    let _workers =
        crate::checks::workers::spawn(state.scheduler.clone(), state.config.scheduler.workers);

    for check in state.checks.iter() {
        state.scheduler.schedule(check.clone());
    }
}
