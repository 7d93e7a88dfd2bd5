//! The pluggable unit of work a [`Check`](super::check::Check) wraps.
//!
//! A probe is anything that can produce a fresh [`Outcome`] on demand.
//! The built-in [`CommandProbe`] shells out to an external command;
//! other probes (used heavily in tests) are plain closures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

const NO_OUTPUT: &str = "<no output>";

/// `ok` or `err`. Mirrors the boolean-like tag described for UI
/// serialization and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Err,
}

impl Status {
    pub fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// A probe result: a status tag plus human-readable text. Empty text
/// is normalized to `"<no output>"` so the UI never renders a blank
/// line for a check that produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    pub text: String,
}

impl Outcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self::new(Status::Ok, text)
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self::new(Status::Err, text)
    }

    pub fn new(status: Status, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.is_empty() {
            NO_OUTPUT.to_string()
        } else {
            text
        };
        Self { status, text }
    }

    /// The sentinel reported before any check has ever run.
    pub fn unset() -> Self {
        // Treated as `ok` for aggregation purposes (see Check::run and
        // the global-status rule in the spec's external interfaces).
        Self {
            status: Status::Ok,
            text: "<no checks were performed yet>".to_string(),
        }
    }
}

/// A unit of observation: produces a fresh [`Outcome`] when invoked.
/// Probes never propagate errors — any failure to even start (e.g. a
/// missing binary) is captured as an `err` outcome by the
/// implementation, not as a `Result::Err`.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn invoke(&self) -> Outcome;
}

/// A probe backed by an arbitrary async closure. Handy for tests and
/// for probes that don't need a subprocess.
pub struct ClosureProbe<F> {
    f: F,
}

impl<F> ClosureProbe<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F, Fut> Probe for ClosureProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Outcome> + Send,
{
    async fn invoke(&self) -> Outcome {
        (self.f)().await
    }
}

/// Built-in probe that spawns an external command.
///
/// Exit status 0 produces `(ok, stdout)`; anything else produces
/// `(err, captured_text)`, where `captured_text` includes stderr when
/// `capture_stderr` is set (the default).
pub struct CommandProbe {
    argv: Vec<String>,
    capture_stderr: bool,
}

impl CommandProbe {
    /// Build a probe from a shell-style command line, tokenized with
    /// `shell-words`. Falls back to a single-token argv (so a command
    /// with unbalanced quoting still runs as literally as possible)
    /// rather than failing to construct the probe.
    pub fn from_command_line(command_line: &str, capture_stderr: bool) -> Self {
        let argv = shell_words::split(command_line)
            .unwrap_or_else(|_| vec![command_line.to_string()]);
        Self { argv, capture_stderr }
    }

    /// Build a probe from an already-tokenized argument vector.
    pub fn from_argv(argv: Vec<String>, capture_stderr: bool) -> Self {
        Self { argv, capture_stderr }
    }
}

#[async_trait]
impl Probe for CommandProbe {
    async fn invoke(&self) -> Outcome {
        let Some((program, args)) = self.argv.split_first() else {
            return Outcome::err("empty command");
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        if self.capture_stderr {
            cmd.stderr(std::process::Stdio::piped());
        } else {
            cmd.stderr(std::process::Stdio::null());
        }
        cmd.stdout(std::process::Stdio::piped());
        cmd.stdin(std::process::Stdio::null());

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => return Outcome::err(format!("failed to spawn: {e}")),
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        if self.capture_stderr && !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&stderr);
            }
        }

        if output.status.success() {
            Outcome::ok(text)
        } else {
            Outcome::err(text)
        }
    }
}
