//! Explicit, owned collection of [`Check`]s built by the configuration
//! loader and handed to the scheduler at startup.
//!
//! This replaces the "global mutable registry of checks" pattern
//! flagged in the design notes: there is no process-wide list appended
//! to by a constructor, only this struct, constructed once in
//! `bootstrap` and consumed by `Scheduler::new`.

use std::sync::Arc;

use super::check::Check;

#[derive(Default)]
pub struct CheckRegistry {
    checks: Vec<Arc<Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, check: Check) {
        self.checks.push(Arc::new(check));
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Check>> {
        self.checks.iter()
    }

    pub fn into_checks(self) -> Vec<Arc<Check>> {
        self.checks
    }

    pub fn find(&self, name: &str) -> Option<Arc<Check>> {
        self.checks.iter().find(|c| c.name == name).cloned()
    }
}
