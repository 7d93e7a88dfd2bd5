//! The dispatcher: a priority-ordered set of pending check activations
//! keyed by earliest-next-run-time, released to a ready queue by a
//! single task sleeping on a cancellable timer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::check::Check;
use super::history::{GlobalEntry, GlobalHistory};
use super::probe::Outcome;
use super::time::far_past;

/// What a pending entry carries: either a check waiting for its due
/// time, or the poison marker used by `flush()` to interrupt the
/// dispatcher (see Scheduler::flush).
enum Item {
    Check(Arc<Check>),
    Flush,
}

struct PendingEntry {
    due: DateTime<Utc>,
    /// Insertion sequence, used only to break ties between equal due
    /// times so the heap gives a total order and no entry starves —
    /// comparing `Check`s directly (as the source did) is exactly the
    /// anti-pattern the design notes call out.
    seq: u64,
    item: Item,
}

impl PartialEq for PendingEntry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}
impl Eq for PendingEntry {}

impl PartialOrd for PendingEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: `BinaryHeap` is a max-heap, but we want the
        // earliest due time (and, on ties, the earliest sequence) to
        // come out first.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority-ordered pending set plus the single dispatch loop, ready
/// queue, and scheduler-wide outcome history.
pub struct Scheduler {
    pending: Mutex<BinaryHeap<PendingEntry>>,
    ready_tx: async_channel::Sender<Arc<Check>>,
    ready_rx: async_channel::Receiver<Arc<Check>>,
    /// Wakes the dispatcher when a new pending entry may need to
    /// preempt the current sleep, or when the pending set transitions
    /// from empty to non-empty.
    item_available: Notify,
    /// Cancels the dispatcher's in-flight sleep.
    cancel_notify: Notify,
    /// Signalled once a `flush()` drain has completed.
    flush_ack: Notify,
    /// Serializes `flush()` calls — the source does not defend against
    /// concurrent flushes, so callers get "at most one in-flight
    /// flush" rather than undefined interleaving.
    flush_lock: tokio::sync::Mutex<()>,
    seq: AtomicU64,
    global_history: Mutex<GlobalHistory>,
}

impl Scheduler {
    pub fn new(global_history_capacity: usize) -> Arc<Self> {
        let (ready_tx, ready_rx) = async_channel::unbounded();
        Arc::new(Self {
            pending: Mutex::new(BinaryHeap::new()),
            ready_tx,
            ready_rx,
            item_available: Notify::new(),
            cancel_notify: Notify::new(),
            flush_ack: Notify::new(),
            flush_lock: tokio::sync::Mutex::new(()),
            seq: AtomicU64::new(0),
            global_history: Mutex::new(GlobalHistory::new(global_history_capacity)),
        })
    }

    /// A clone-able receiving end of the ready queue; each worker
    /// holds its own clone so N workers can drain the same queue.
    pub fn ready_receiver(&self) -> async_channel::Receiver<Arc<Check>> {
        self.ready_rx.clone()
    }

    /// Compute the check's next due time, enqueue it, and interrupt
    /// the dispatcher's current sleep so it can re-evaluate the
    /// pending set's minimum.
    pub fn schedule(&self, check: Arc<Check>) {
        let due = check.next_due();
        self.push_pending(due, Item::Check(check));
        self.cancel_notify.notify_one();
    }

    /// Force every currently-pending entry to become ready
    /// immediately, including the entry the dispatcher is currently
    /// sleeping on (if any). At most one flush may be in flight.
    pub async fn flush(&self) {
        let _guard = self.flush_lock.lock().await;
        let notified = self.flush_ack.notified();
        self.push_pending(far_past(), Item::Flush);
        self.cancel_notify.notify_one();
        notified.await;
    }

    /// Append an outcome to the scheduler-wide ring. Called by workers
    /// right after a check finishes running.
    pub fn record_global(&self, check_name: &str, outcome: &Outcome) {
        self.global_history.lock().push_front(GlobalEntry {
            timestamp: Utc::now(),
            check_name: check_name.to_string(),
            status: outcome.status,
            text: outcome.text.clone(),
        });
    }

    pub fn global_history_snapshot(&self) -> Vec<GlobalEntry> {
        self.global_history.lock().to_vec()
    }

    fn push_pending(&self, due: DateTime<Utc>, item: Item) {
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        self.pending.lock().push(PendingEntry { due, seq, item });
        self.item_available.notify_one();
    }

    async fn pop_min(&self) -> PendingEntry {
        loop {
            let notified = self.item_available.notified();
            if let Some(entry) = self.pending.lock().pop() {
                return entry;
            }
            notified.await;
        }
    }

    /// Drain everything currently pending straight to the ready queue,
    /// skipping any further poison markers encountered mid-drain.
    async fn drain_to_ready(&self) {
        let entries: Vec<PendingEntry> = {
            let mut heap = self.pending.lock();
            std::mem::take(&mut *heap).into_vec()
        };
        for entry in entries {
            if let Item::Check(check) = entry.item {
                let _ = self.ready_tx.send(check).await;
            }
        }
    }

    /// The single dispatch loop. Runs until the process exits; never
    /// returns in normal operation.
    pub async fn run_forever(self: Arc<Self>) {
        loop {
            let entry = self.pop_min().await;
            match entry.item {
                Item::Flush => {
                    self.drain_to_ready().await;
                    self.flush_ack.notify_one();
                }
                Item::Check(check) => {
                    let due = entry.due;
                    let delay = (due - Utc::now()).max(chrono::Duration::zero());
                    let delay_std = delay.to_std().unwrap_or(std::time::Duration::ZERO);

                    let cancelled = self.cancel_notify.notified();
                    tokio::select! {
                        _ = tokio::time::sleep(delay_std) => {
                            let _ = self.ready_tx.send(check).await;
                        }
                        _ = cancelled => {
                            // Preempted: put the entry back unchanged
                            // and let the outer loop re-read the min.
                            self.push_pending_keep_seq(due, entry.seq, Item::Check(check));
                        }
                    }
                }
            }
        }
    }

    /// Re-insert an entry that was popped and then cancelled, keeping
    /// its original sequence number so it doesn't jump ahead of
    /// entries enqueued while it was being slept on.
    fn push_pending_keep_seq(&self, due: DateTime<Utc>, seq: u64, item: Item) {
        self.pending.lock().push(PendingEntry { due, seq, item });
        self.item_available.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::probe::ClosureProbe;
    use std::time::Duration as StdDuration;
    use tokio::time::{advance, Duration as TokioDuration};

    fn make_check(name: &str, interval: StdDuration) -> Arc<Check> {
        Arc::new(Check::new(
            name,
            None,
            interval,
            Arc::new(ClosureProbe::new(|| async { Outcome::ok("hi") })),
            10,
        ))
    }

    #[tokio::test]
    async fn schedule_then_flush_drains_everything() {
        let scheduler = Scheduler::new(100);
        let a = make_check("a", StdDuration::from_secs(600));
        let b = make_check("b", StdDuration::from_secs(600));
        let c = make_check("c", StdDuration::from_secs(600));

        let dispatcher = scheduler.clone();
        tokio::spawn(dispatcher.run_forever());

        scheduler.schedule(a.clone());
        scheduler.schedule(b.clone());
        scheduler.schedule(c.clone());

        scheduler.flush().await;

        let rx = scheduler.ready_receiver();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..3 {
            let check = tokio::time::timeout(StdDuration::from_secs(1), rx.recv())
                .await
                .expect("flush should deliver within 1s")
                .unwrap();
            seen.insert(check.name.clone());
        }
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_arrival_preempts_current_sleep() {
        let scheduler = Scheduler::new(100);
        let dispatcher = scheduler.clone();
        tokio::spawn(dispatcher.run_forever());

        let slow = make_check("slow", StdDuration::from_secs(100));
        // Run once so `next_due` is `now + 100s`, not the never-run
        // sentinel — otherwise both checks would be immediately due.
        slow.run().await;
        scheduler.schedule(slow.clone());

        // give the dispatcher a chance to start sleeping on `slow`
        tokio::task::yield_now().await;

        let fast = make_check("fast", StdDuration::from_millis(1));
        // never run -> `next_due()` is `far_past()`, preempting `slow`.
        scheduler.schedule(fast.clone());

        let rx = scheduler.ready_receiver();
        advance(TokioDuration::from_millis(50)).await;
        let check = tokio::time::timeout(StdDuration::from_secs(1), rx.recv())
            .await
            .expect("fast check should preempt slow")
            .unwrap();
        assert_eq!(check.name, "fast");
    }

    #[test]
    fn pending_entry_orders_by_due_then_seq() {
        let mut heap = BinaryHeap::new();
        let t0 = far_past();
        let t1 = t0 + chrono::Duration::seconds(10);
        heap.push(PendingEntry {
            due: t1,
            seq: 0,
            item: Item::Flush,
        });
        heap.push(PendingEntry {
            due: t0,
            seq: 1,
            item: Item::Flush,
        });
        let first = heap.pop().unwrap();
        assert_eq!(first.due, t0);
    }
}
