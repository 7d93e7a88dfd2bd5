//! A fixed-size pool of worker tasks draining the scheduler's ready
//! queue, invoking checks, and re-enrolling them.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::scheduler::Scheduler;

/// Spawn `count` daemon worker tasks against `scheduler`. They run for
/// the remainder of the process's lifetime; there is no shutdown path
/// (see spec §7: fatal errors are the only exit).
pub fn spawn(scheduler: Arc<Scheduler>, count: usize) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { worker_loop(id, scheduler).await })
        })
        .collect()
}

async fn worker_loop(id: usize, scheduler: Arc<Scheduler>) {
    let ready = scheduler.ready_receiver();
    loop {
        let check = match ready.recv().await {
            Ok(check) => check,
            // Sender dropped only if the scheduler itself is gone —
            // nothing left to do.
            Err(_) => {
                tracing::warn!(worker = id, "ready queue closed, worker exiting");
                break;
            }
        };

        tracing::debug!(worker = id, check = %check.name, "running check");
        let outcome = check.run().await;
        scheduler.record_global(&check.name, &outcome);
        scheduler.schedule(check);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::check::Check;
    use crate::checks::probe::{ClosureProbe, Outcome};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn worker_pool_drains_ready_and_reschedules() {
        let scheduler = Scheduler::new(100);
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();
        let probe = Arc::new(ClosureProbe::new(move || {
            let count = count2.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
                Outcome::ok("hi")
            }
        }));
        let check = Arc::new(Check::new("c", None, Duration::from_millis(5), probe, 10));

        let dispatcher = scheduler.clone();
        tokio::spawn(dispatcher.run_forever());
        let _workers = spawn(scheduler.clone(), 2);

        scheduler.schedule(check);

        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if count.load(Ordering::SeqCst) >= 3 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("check should run repeatedly within 2s");

        assert!(!scheduler.global_history_snapshot().is_empty());
    }
}
