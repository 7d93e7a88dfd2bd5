//! Small time helpers shared by the scheduler and checks.

use chrono::{DateTime, Utc};

/// Sentinel "run immediately" timestamp: any concrete time the
/// scheduler compares against is `>=` this, so a check carrying it as
/// its `next_due` always sorts to the front of the pending queue.
pub fn far_past() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(0, 0).expect("unix epoch is a valid timestamp")
}
