//! Vec-backed in-memory session store.
//!
//! Used heavily by the engine and aggregator tests, and usable as an
//! ephemeral backend when persistence is not wanted. Not safe for
//! concurrent mutation — the SQLite store is the one with real atomicity.

use chrono::{DateTime, Utc};

use crate::error::TrackerError;
use crate::repository::{SessionRepository, StartOutcome};
use crate::session::{Session, SessionKind, SessionStatus};
use crate::types::{SessionId, UserId};

/// In-memory [`SessionRepository`] implementation.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    sessions: Vec<Session>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn latest<'a>(
        &'a self,
        mut matches: impl FnMut(&Session) -> bool,
    ) -> Option<&'a Session> {
        self.sessions
            .iter()
            .filter(|s| matches(s))
            .max_by_key(|s| s.start_time)
    }
}

impl SessionRepository for MemoryRepository {
    fn insert_if_no_active(&mut self, session: &Session) -> Result<StartOutcome, TrackerError> {
        let active_exists = self.sessions.iter().any(|s| {
            s.user_id == session.user_id
                && s.kind == session.kind
                && s.status == SessionStatus::Active
        });
        if active_exists {
            return Ok(StartOutcome::ActiveExists);
        }
        self.sessions.push(session.clone());
        Ok(StartOutcome::Created)
    }

    fn get(&self, id: &SessionId) -> Result<Option<Session>, TrackerError> {
        Ok(self.sessions.iter().find(|s| &s.id == id).cloned())
    }

    fn find_active(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError> {
        Ok(self
            .latest(|s| {
                &s.user_id == user && s.kind == kind && s.status == SessionStatus::Active
            })
            .cloned())
    }

    fn find_open(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError> {
        Ok(self
            .latest(|s| &s.user_id == user && s.kind == kind && s.is_open())
            .cloned())
    }

    fn find_open_any(&self, user: &UserId) -> Result<Option<Session>, TrackerError> {
        Ok(self.latest(|s| &s.user_id == user && s.is_open()).cloned())
    }

    fn find_most_recent(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError> {
        Ok(self
            .latest(|s| &s.user_id == user && s.kind == kind)
            .cloned())
    }

    fn list_in_range(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, TrackerError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .filter(|s| &s.user_id == user && s.start_time >= start && s.start_time < end)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    fn update_if_status(
        &mut self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, TrackerError> {
        match self
            .sessions
            .iter_mut()
            .find(|s| s.id == session.id && s.status == expected)
        {
            Some(stored) => {
                stored.status = session.status;
                stored.end_time = session.end_time;
                stored.paused_at = session.paused_at;
                stored.remaining_minutes = session.remaining_minutes;
                stored.paused_minutes = session.paused_minutes;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SessionId, UserId};

    fn session(id: &str, user: &str, kind: SessionKind, start: &str) -> Session {
        Session::begin(
            SessionId::new(id).unwrap(),
            UserId::new(user).unwrap(),
            kind,
            start.parse().unwrap(),
            None,
        )
    }

    #[test]
    fn second_active_insert_is_rejected() {
        let mut repo = MemoryRepository::new();
        let first = session("s1", "u1", SessionKind::Break, "2025-06-01T09:00:00Z");
        let second = session("s2", "u1", SessionKind::Break, "2025-06-01T09:01:00Z");

        assert_eq!(
            repo.insert_if_no_active(&first).unwrap(),
            StartOutcome::Created
        );
        assert_eq!(
            repo.insert_if_no_active(&second).unwrap(),
            StartOutcome::ActiveExists
        );
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn different_kinds_do_not_conflict() {
        let mut repo = MemoryRepository::new();
        let focus = session("s1", "u1", SessionKind::Focus, "2025-06-01T09:00:00Z");
        let work = session("s2", "u1", SessionKind::Work, "2025-06-01T09:00:00Z");

        assert_eq!(
            repo.insert_if_no_active(&focus).unwrap(),
            StartOutcome::Created
        );
        assert_eq!(
            repo.insert_if_no_active(&work).unwrap(),
            StartOutcome::Created
        );
    }

    #[test]
    fn update_if_status_is_a_compare_and_swap() {
        let mut repo = MemoryRepository::new();
        let mut s = session("s1", "u1", SessionKind::Focus, "2025-06-01T09:00:00Z");
        repo.insert_if_no_active(&s).unwrap();

        s.status = SessionStatus::Paused;
        s.paused_at = Some("2025-06-01T09:10:00Z".parse().unwrap());
        assert!(repo.update_if_status(&s, SessionStatus::Active).unwrap());
        // Second swap against the stale expectation fails.
        assert!(!repo.update_if_status(&s, SessionStatus::Active).unwrap());

        let stored = repo.get(&s.id).unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Paused);
    }

    #[test]
    fn range_query_is_half_open() {
        let mut repo = MemoryRepository::new();
        for (id, start) in [
            ("s1", "2025-06-01T00:00:00Z"),
            ("s2", "2025-06-01T23:59:59Z"),
            ("s3", "2025-06-02T00:00:00Z"),
        ] {
            repo.insert_if_no_active(&{
                let mut s = session(id, "u1", SessionKind::Work, start);
                s.status = SessionStatus::Completed;
                s.end_time = Some(s.start_time);
                s
            })
            .unwrap();
        }

        let user = UserId::new("u1").unwrap();
        let found = repo
            .list_in_range(
                &user,
                "2025-06-01T00:00:00Z".parse().unwrap(),
                "2025-06-02T00:00:00Z".parse().unwrap(),
            )
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2"]);
    }
}
