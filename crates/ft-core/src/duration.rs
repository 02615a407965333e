//! Pure duration arithmetic over session timestamps.
//!
//! Everything here is a free function of a session and an instant; none of
//! it touches storage or the clock. The engine and the daily aggregator are
//! the only callers.

use chrono::{DateTime, Utc};

use crate::session::Session;

/// Measured and planned durations within this many minutes of each other
/// are reported as the plan, masking scheduler/latency jitter around a
/// natural timer completion.
pub const RECONCILE_TOLERANCE_MIN: i64 = 1;

/// Whole minutes between two instants, floored, never negative.
#[must_use]
pub fn elapsed_minutes(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_seconds().max(0) / 60
}

/// Minutes the session has actually been running as of `at`: wall-clock
/// elapsed minus accumulated paused time, floored at zero.
#[must_use]
pub fn active_elapsed_minutes(session: &Session, at: DateTime<Utc>) -> i64 {
    (elapsed_minutes(session.start_time, at) - session.paused_minutes).max(0)
}

/// Remaining minutes of the plan when pausing at `paused_at`.
///
/// `None` for open-ended sessions; never negative.
#[must_use]
pub fn remaining_after_pause(session: &Session, paused_at: DateTime<Utc>) -> Option<i64> {
    session
        .planned_minutes
        .map(|planned| (planned - active_elapsed_minutes(session, paused_at)).max(0))
}

/// Final duration of an ended session, in minutes.
///
/// Absent while the session is open. When a plan exists and the measured
/// active time lands within [`RECONCILE_TOLERANCE_MIN`] of it, the plan is
/// reported instead of the raw measurement.
#[must_use]
pub fn actual_duration(session: &Session) -> Option<i64> {
    let end = session.end_time?;
    let active = active_elapsed_minutes(session, end);
    match session.planned_minutes {
        Some(planned) if (active - planned).abs() <= RECONCILE_TOLERANCE_MIN => Some(planned),
        _ => Some(active),
    }
}
