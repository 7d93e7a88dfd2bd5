//! A scheduled wrapper around a [`Probe`]: owns polling interval,
//! display metadata, last-run bookkeeping, and a bounded history.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::history::CheckHistory;
use super::probe::{Outcome, Probe, Status};

/// Failure-case back-off: probe more often than the nominal interval
/// to detect recovery quickly, but never more often than every 10s or
/// less often than every 120s.
const BACKOFF_FLOOR: Duration = Duration::from_secs(10);
const BACKOFF_CEIL: Duration = Duration::from_secs(120);

/// Logged when a run starts more than `interval + SCHEDULE_SLACK`
/// after the previous one completed.
const SCHEDULE_SLACK: Duration = Duration::from_secs(1);

struct CheckState {
    last_checked: Option<DateTime<Utc>>,
    last_outcome: Outcome,
    history: CheckHistory,
}

/// A named, periodically invoked probe with bookkeeping.
///
/// `run` and `next_due` are the only operations that touch mutable
/// state; both take `&self` because the state is interior-mutable —
/// the scheduler only ever calls `run` from the single worker holding
/// the check, so there is no concurrent-writer hazard in practice.
pub struct Check {
    pub name: String,
    pub description: Option<String>,
    pub interval: Duration,
    probe: Arc<dyn Probe>,
    state: RwLock<CheckState>,
}

/// Read-only projection used by the HTTP API and tests.
#[derive(Debug, Clone, Serialize)]
pub struct CheckSnapshot {
    pub name: String,
    pub description: Option<String>,
    pub interval_secs: u64,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_outcome: Outcome,
    pub history: Vec<Outcome>,
    pub next_due: DateTime<Utc>,
}

impl Check {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        interval: Duration,
        probe: Arc<dyn Probe>,
        history_capacity: usize,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            interval,
            probe,
            state: RwLock::new(CheckState {
                last_checked: None,
                last_outcome: Outcome::unset(),
                history: CheckHistory::new(history_capacity),
            }),
        }
    }

    /// Invoke the probe, update bookkeeping, and return the outcome.
    /// Never propagates a probe failure — it is captured as an `err`
    /// outcome by the probe itself.
    pub async fn run(&self) -> Outcome {
        let previous_checked = self.state.read().last_checked;
        if let Some(last_checked) = previous_checked {
            let elapsed = Utc::now() - last_checked;
            let allowed = chrono::Duration::from_std(self.interval + SCHEDULE_SLACK)
                .unwrap_or_else(|_| chrono::Duration::days(365_000));
            if elapsed > allowed {
                tracing::error!(
                    check = %self.name,
                    elapsed_secs = elapsed.num_seconds(),
                    interval_secs = self.interval.as_secs(),
                    "check behind schedule"
                );
            }
        }

        let outcome = self.probe.invoke().await;
        let completed_at = Utc::now();

        let mut state = self.state.write();
        state.last_checked = Some(completed_at);
        state.last_outcome = outcome.clone();
        state.history.push(outcome.clone());

        outcome
    }

    /// The timestamp at which this check should next execute.
    pub fn next_due(&self) -> DateTime<Utc> {
        let state = self.state.read();
        match state.last_checked {
            None => super::time::far_past(),
            Some(last_checked) => {
                let delay = match state.last_outcome.status {
                    Status::Ok => self.interval,
                    Status::Err => backoff(self.interval),
                };
                last_checked
                    + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero())
            }
        }
    }

    pub fn last_outcome(&self) -> Outcome {
        self.state.read().last_outcome.clone()
    }

    pub fn snapshot(&self) -> CheckSnapshot {
        let state = self.state.read();
        let next_due = match state.last_checked {
            None => super::time::far_past(),
            Some(last_checked) => {
                let delay = match state.last_outcome.status {
                    Status::Ok => self.interval,
                    Status::Err => backoff(self.interval),
                };
                last_checked
                    + chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::zero())
            }
        };
        CheckSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            interval_secs: self.interval.as_secs(),
            last_checked: state.last_checked,
            last_outcome: state.last_outcome.clone(),
            history: state.history.to_vec(),
            next_due,
        }
    }
}

/// `clamp(interval / 3, 10s, 120s)`.
fn backoff(interval: Duration) -> Duration {
    let third = interval / 3;
    third.clamp(BACKOFF_FLOOR, BACKOFF_CEIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::probe::ClosureProbe;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ok_probe() -> Arc<dyn Probe> {
        Arc::new(ClosureProbe::new(|| async { Outcome::ok("fine") }))
    }

    fn err_probe() -> Arc<dyn Probe> {
        Arc::new(ClosureProbe::new(|| async { Outcome::err("boom") }))
    }

    #[test]
    fn never_run_reports_next_due_immediately() {
        let check = Check::new("c", None, Duration::from_secs(60), ok_probe(), 10);
        assert_eq!(check.next_due(), crate::checks::time::far_past());
    }

    #[tokio::test]
    async fn run_updates_last_outcome_and_history_tail() {
        let check = Check::new("c", None, Duration::from_secs(60), ok_probe(), 10);
        check.run().await;
        let snap = check.snapshot();
        assert_eq!(snap.last_outcome.text, "fine");
        assert_eq!(snap.history.last().unwrap().text, "fine");
        assert!(snap.last_checked.is_some());
    }

    #[tokio::test]
    async fn ok_next_due_is_last_checked_plus_interval() {
        let check = Check::new("c", None, Duration::from_secs(60), ok_probe(), 10);
        check.run().await;
        let last_checked = check.snapshot().last_checked.unwrap();
        let due = check.next_due();
        assert_eq!(due, last_checked + chrono::Duration::seconds(60));
    }

    #[tokio::test]
    async fn err_next_due_uses_backoff_floor() {
        // interval 60s -> interval/3 == 20s, clamp(20,10,120) == 20s
        let check = Check::new("c", None, Duration::from_secs(60), err_probe(), 10);
        check.run().await;
        let last_checked = check.snapshot().last_checked.unwrap();
        let due = check.next_due();
        assert_eq!(due, last_checked + chrono::Duration::seconds(20));
    }

    #[tokio::test]
    async fn err_next_due_floor_clamped_to_10s() {
        // interval 15s -> interval/3 == 5s, clamp(5,10,120) == 10s
        let check = Check::new("c", None, Duration::from_secs(15), err_probe(), 10);
        check.run().await;
        let last_checked = check.snapshot().last_checked.unwrap();
        let due = check.next_due();
        assert_eq!(due, last_checked + chrono::Duration::seconds(10));
    }

    #[tokio::test]
    async fn err_next_due_ceiling_clamped_to_120s() {
        // interval 3600s -> interval/3 == 1200s, clamp(1200,10,120) == 120s
        let check = Check::new("c", None, Duration::from_secs(3600), err_probe(), 10);
        check.run().await;
        let last_checked = check.snapshot().last_checked.unwrap();
        let due = check.next_due();
        assert_eq!(due, last_checked + chrono::Duration::seconds(120));
    }

    #[tokio::test]
    async fn history_capacity_is_bounded() {
        let check = Check::new("c", None, Duration::from_millis(1), ok_probe(), 3);
        for _ in 0..10 {
            check.run().await;
        }
        assert_eq!(check.snapshot().history.len(), 3);
    }

    #[tokio::test]
    async fn probe_invocation_count_matches_run_count() {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let probe: Arc<dyn Probe> = Arc::new(ClosureProbe::new(move || {
            let count = count2.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Outcome::ok("x")
            }
        }));
        let check = Check::new("c", None, Duration::from_secs(60), probe, 10);
        check.run().await;
        check.run().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
