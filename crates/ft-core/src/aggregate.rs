//! Daily roll-ups of ended sessions.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::duration;
use crate::error::TrackerError;
use crate::repository::SessionRepository;
use crate::session::{SessionKind, SessionStatus};
use crate::types::UserId;

/// Per-kind totals within one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindTotals {
    pub sessions: u32,
    pub completed: u32,
    pub minutes: i64,
}

/// One user's totals for one UTC day. Every kind is present, zeroed when
/// nothing ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub kinds: BTreeMap<SessionKind, KindTotals>,
    pub total_minutes: i64,
}

/// Aggregates the user's ended sessions whose start fell on `date` (UTC).
///
/// Open sessions are excluded; they contribute once they end. Stopped
/// sessions count toward `sessions` and `minutes` but not `completed`.
pub fn daily_summary<R: SessionRepository>(
    repo: &R,
    user: &UserId,
    date: NaiveDate,
) -> Result<DailySummary, TrackerError> {
    let day_start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    let day_end = day_start + chrono::Duration::days(1);

    let mut kinds: BTreeMap<SessionKind, KindTotals> = SessionKind::ALL
        .iter()
        .map(|kind| (*kind, KindTotals::default()))
        .collect();

    for session in repo.list_in_range(user, day_start, day_end)? {
        let Some(minutes) = duration::actual_duration(&session) else {
            continue;
        };
        let totals = kinds.entry(session.kind).or_default();
        totals.sessions += 1;
        if session.status == SessionStatus::Completed {
            totals.completed += 1;
        }
        totals.minutes += minutes;
    }

    let total_minutes = kinds.values().map(|t| t.minutes).sum();
    Ok(DailySummary {
        user_id: user.clone(),
        date,
        kinds,
        total_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRepository;
    use crate::session::Session;
    use crate::types::SessionId;
    use chrono::{DateTime, Utc};

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn ended(
        id: &str,
        kind: SessionKind,
        start: &str,
        end: &str,
        planned: Option<i64>,
        status: SessionStatus,
    ) -> Session {
        let mut session = Session::begin(
            SessionId::new(id).unwrap(),
            UserId::new("sami").unwrap(),
            kind,
            ts(start),
            planned,
        );
        session.end_time = Some(ts(end));
        session.status = status;
        session
    }

    fn seed(repo: &mut MemoryRepository, session: &Session) {
        repo.insert_if_no_active(session).unwrap();
    }

    #[test]
    fn empty_day_has_all_kinds_zeroed() {
        let repo = MemoryRepository::new();
        let user = UserId::new("sami").unwrap();

        let summary =
            daily_summary(&repo, &user, "2025-06-01".parse().unwrap()).unwrap();
        assert_eq!(summary.kinds.len(), SessionKind::ALL.len());
        assert!(summary.kinds.values().all(|t| *t == KindTotals::default()));
        assert_eq!(summary.total_minutes, 0);
    }

    #[test]
    fn sums_per_kind_and_overall() {
        let mut repo = MemoryRepository::new();
        let user = UserId::new("sami").unwrap();
        seed(
            &mut repo,
            &ended(
                "a",
                SessionKind::Focus,
                "2025-06-01T09:00:00Z",
                "2025-06-01T09:25:00Z",
                Some(25),
                SessionStatus::Completed,
            ),
        );
        seed(
            &mut repo,
            &ended(
                "b",
                SessionKind::Focus,
                "2025-06-01T10:00:00Z",
                "2025-06-01T10:10:00Z",
                Some(25),
                SessionStatus::Stopped,
            ),
        );
        seed(
            &mut repo,
            &ended(
                "c",
                SessionKind::Break,
                "2025-06-01T09:25:00Z",
                "2025-06-01T09:30:00Z",
                Some(5),
                SessionStatus::Completed,
            ),
        );

        let summary =
            daily_summary(&repo, &user, "2025-06-01".parse().unwrap()).unwrap();
        let focus = &summary.kinds[&SessionKind::Focus];
        assert_eq!(focus.sessions, 2);
        assert_eq!(focus.completed, 1);
        assert_eq!(focus.minutes, 35);
        assert_eq!(summary.kinds[&SessionKind::Break].minutes, 5);
        assert_eq!(summary.total_minutes, 40);
    }

    #[test]
    fn open_sessions_are_excluded() {
        let mut repo = MemoryRepository::new();
        let user = UserId::new("sami").unwrap();
        let open = Session::begin(
            SessionId::new("open").unwrap(),
            user.clone(),
            SessionKind::Focus,
            ts("2025-06-01T09:00:00Z"),
            Some(25),
        );
        seed(&mut repo, &open);

        let summary =
            daily_summary(&repo, &user, "2025-06-01".parse().unwrap()).unwrap();
        assert_eq!(summary.kinds[&SessionKind::Focus].sessions, 0);
    }

    #[test]
    fn day_boundary_is_half_open() {
        let mut repo = MemoryRepository::new();
        let user = UserId::new("sami").unwrap();
        // Starts at 23:50 on the 1st, ends on the 2nd: belongs to the 1st.
        seed(
            &mut repo,
            &ended(
                "late",
                SessionKind::Work,
                "2025-06-01T23:50:00Z",
                "2025-06-02T00:20:00Z",
                None,
                SessionStatus::Completed,
            ),
        );
        // Starts exactly at midnight of the 2nd: belongs to the 2nd.
        seed(
            &mut repo,
            &ended(
                "next",
                SessionKind::Work,
                "2025-06-02T00:00:00Z",
                "2025-06-02T01:00:00Z",
                None,
                SessionStatus::Completed,
            ),
        );

        let first =
            daily_summary(&repo, &user, "2025-06-01".parse().unwrap()).unwrap();
        assert_eq!(first.kinds[&SessionKind::Work].minutes, 30);
        let second =
            daily_summary(&repo, &user, "2025-06-02".parse().unwrap()).unwrap();
        assert_eq!(second.kinds[&SessionKind::Work].minutes, 60);
    }

    #[test]
    fn other_users_are_excluded() {
        let mut repo = MemoryRepository::new();
        let mut other = ended(
            "x",
            SessionKind::Focus,
            "2025-06-01T09:00:00Z",
            "2025-06-01T09:25:00Z",
            Some(25),
            SessionStatus::Completed,
        );
        other.user_id = UserId::new("lena").unwrap();
        seed(&mut repo, &other);

        let summary = daily_summary(
            &repo,
            &UserId::new("sami").unwrap(),
            "2025-06-01".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(summary.total_minutes, 0);
    }
}
