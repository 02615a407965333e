//! Persistence boundary consumed by the engine and the aggregator.

use chrono::{DateTime, Utc};

use crate::error::TrackerError;
use crate::session::{Session, SessionKind, SessionStatus};
use crate::types::{SessionId, UserId};

/// Result of the atomic Start insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The session was created; no active session of that kind existed.
    Created,
    /// An active session for the same `(user, kind)` already exists; the
    /// insert was not performed.
    ActiveExists,
}

/// Session store operations.
///
/// The engine is the trait's sole mutator. Implementations must make
/// [`insert_if_no_active`](Self::insert_if_no_active) atomic — the
/// no-active check and the insert happen in one transaction or conditional
/// write, so two concurrent Starts for the same `(user, kind)` cannot both
/// succeed. [`update_if_status`](Self::update_if_status) is a
/// compare-and-swap on the session's status, which linearizes Pause,
/// Resume, and Stop against each other.
pub trait SessionRepository {
    /// Inserts `session` unless an active session for the same
    /// `(user, kind)` exists.
    fn insert_if_no_active(&mut self, session: &Session) -> Result<StartOutcome, TrackerError>;

    /// Fetches a session by ID.
    fn get(&self, id: &SessionId) -> Result<Option<Session>, TrackerError>;

    /// The active session for `(user, kind)`, if any. The store guarantees
    /// at most one exists.
    fn find_active(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError>;

    /// The most recently started open session (no end time) for
    /// `(user, kind)` — covers both active and paused.
    fn find_open(&self, user: &UserId, kind: SessionKind)
    -> Result<Option<Session>, TrackerError>;

    /// The most recently started open session for the user, any kind.
    fn find_open_any(&self, user: &UserId) -> Result<Option<Session>, TrackerError>;

    /// The most recently started session of a kind, regardless of state.
    fn find_most_recent(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError>;

    /// Sessions whose `start_time` falls in `[start, end)`, ordered by
    /// start time.
    fn list_in_range(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, TrackerError>;

    /// Writes the mutable fields of `session` if the stored row still has
    /// status `expected`. Returns whether the swap happened. Immutable
    /// fields (`user_id`, `kind`, `start_time`, `planned_minutes`,
    /// `created_date`) are never rewritten, and a set `end_time` is never
    /// overwritten because terminal statuses are never passed as
    /// `expected`.
    fn update_if_status(
        &mut self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, TrackerError>;
}
