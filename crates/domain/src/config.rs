use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub message: String,
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Config {
    /// Validate the config, returning a list of warnings/errors rather
    /// than failing fast — the caller decides what to do with them.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.checks.is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                message: "no checks configured — the scheduler will idle".into(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for check in &self.checks {
            if check.interval_secs == 0 {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Error,
                    message: format!("check '{}': interval_secs must be > 0", check.name),
                });
            }
            if check.command.is_empty() {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Error,
                    message: format!("check '{}': command must not be empty", check.name),
                });
            }
            if !seen.insert(check.name.clone()) {
                issues.push(ConfigIssue {
                    severity: ConfigSeverity::Warning,
                    message: format!("check name '{}' is used more than once", check.name),
                });
            }
        }

        if self.scheduler.workers == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                message: "scheduler.workers must be > 0".into(),
            });
        }

        issues
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "d_port")]
    pub port: u16,
    #[serde(default = "d_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: d_port(),
            host: d_host(),
        }
    }
}

fn d_port() -> u16 {
    8790
}
fn d_host() -> String {
    "127.0.0.1".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scheduler
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of concurrent worker tasks draining the ready queue.
    #[serde(default = "d_workers")]
    pub workers: usize,
    /// Per-check bounded history capacity.
    #[serde(default = "d_history_capacity")]
    pub history_capacity: usize,
    /// Capacity of the scheduler-wide outcome ring.
    #[serde(default = "d_global_history_capacity")]
    pub global_history_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: d_workers(),
            history_capacity: d_history_capacity(),
            global_history_capacity: d_global_history_capacity(),
        }
    }
}

fn d_workers() -> usize {
    5
}
fn d_history_capacity() -> usize {
    10
}
fn d_global_history_capacity() -> usize {
    10_000
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Checks
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A single check as declared in `config.toml`. The configuration
/// loader turns these into live `Check`s at startup; this type never
/// crosses into the scheduler itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Shell-style command line, tokenized with `shell-words`.
    pub command: String,
    pub interval_secs: u64,
    /// Merge stderr into the captured output (default: true).
    #[serde(default = "d_capture_stderr")]
    pub capture_stderr: bool,
}

fn d_capture_stderr() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_warns_on_no_checks() {
        let config = Config::default();
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| matches!(i.severity, ConfigSeverity::Warning)));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut config = Config::default();
        config.checks.push(CheckConfig {
            name: "bad".into(),
            description: None,
            command: "true".into(),
            interval_secs: 0,
            capture_stderr: true,
        });
        let issues = config.validate();
        assert!(issues
            .iter()
            .any(|i| matches!(i.severity, ConfigSeverity::Error)));
    }

    #[test]
    fn toml_roundtrip() {
        let raw = r#"
            [server]
            port = 9000

            [[checks]]
            name = "disk"
            command = "df -h"
            interval_secs = 30
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.checks.len(), 1);
        assert_eq!(config.checks[0].interval_secs, 30);
        assert!(config.checks[0].capture_stderr);
        assert_eq!(config.scheduler.workers, 5);
    }
}
