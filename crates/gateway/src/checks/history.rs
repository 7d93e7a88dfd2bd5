//! Bounded, oldest-evicting ring buffers used for per-check and
//! scheduler-wide outcome history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::probe::{Outcome, Status};

/// Per-check history: newest entry at the back, oldest evicted from
/// the front once `capacity` is exceeded. `back()` always equals the
/// check's `last_outcome` whenever both are set — this is the
/// invariant the spec calls out explicitly.
#[derive(Debug, Clone)]
pub struct CheckHistory {
    capacity: usize,
    entries: VecDeque<Outcome>,
}

impl CheckHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.entries.push_back(outcome);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Outcome> {
        self.entries.back()
    }

    /// Snapshot, oldest first.
    pub fn to_vec(&self) -> Vec<Outcome> {
        self.entries.iter().cloned().collect()
    }
}

/// One entry in the scheduler-wide history ring.
#[derive(Debug, Clone, Serialize)]
pub struct GlobalEntry {
    pub timestamp: DateTime<Utc>,
    pub check_name: String,
    pub status: Status,
    pub text: String,
}

/// Scheduler-wide bounded ring, append-at-front: the newest completed
/// outcome across all checks always sits at index 0.
#[derive(Debug, Clone)]
pub struct GlobalHistory {
    capacity: usize,
    entries: VecDeque<GlobalEntry>,
}

impl GlobalHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: VecDeque::with_capacity(capacity.max(1).min(1024)),
        }
    }

    pub fn push_front(&mut self, entry: GlobalEntry) {
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Snapshot, newest first.
    pub fn to_vec(&self) -> Vec<GlobalEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn front(&self) -> Option<&GlobalEntry> {
        self.entries.front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_history_evicts_oldest() {
        let mut h = CheckHistory::new(2);
        h.push(Outcome::ok("a"));
        h.push(Outcome::ok("b"));
        h.push(Outcome::ok("c"));
        assert_eq!(h.len(), 2);
        let snapshot = h.to_vec();
        assert_eq!(snapshot[0].text, "b");
        assert_eq!(snapshot[1].text, "c");
        assert_eq!(h.last().unwrap().text, "c");
    }

    #[test]
    fn global_history_front_is_newest() {
        let mut h = GlobalHistory::new(3);
        for name in ["a", "b", "c", "d"] {
            h.push_front(GlobalEntry {
                timestamp: Utc::now(),
                check_name: name.into(),
                status: Status::Ok,
                text: name.into(),
            });
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.front().unwrap().check_name, "d");
        let snapshot = h.to_vec();
        assert_eq!(snapshot[0].check_name, "d");
        assert_eq!(snapshot[2].check_name, "b");
    }
}
