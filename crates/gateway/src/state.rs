use std::sync::Arc;

use hc_domain::config::Config;

use crate::checks::{Check, Scheduler};

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scheduler: Arc<Scheduler>,
    /// Flat list of every check, for name lookups from the HTTP layer.
    /// Owned here (not inside `Scheduler`) because the scheduler only
    /// needs to move checks through `pending`/`ready`, not enumerate
    /// them by name.
    pub checks: Arc<Vec<Arc<Check>>>,
}

impl AppState {
    pub fn find_check(&self, name: &str) -> Option<Arc<Check>> {
        self.checks.iter().find(|c| c.name == name).cloned()
    }
}
