//! The session ledger record and its classification enums.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionId, UserId, ValidationError};

/// Category of a tracked session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Timed deep-work session, usually with a planned duration.
    #[default]
    Focus,
    /// Rest period between focus sessions.
    Break,
    /// Open-ended clocked work, no planned duration.
    Work,
}

impl SessionKind {
    /// Returns the string representation for SQL storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Break => "break",
            Self::Work => "work",
        }
    }

    /// All kinds, in aggregation display order.
    pub const ALL: [Self; 3] = [Self::Break, Self::Focus, Self::Work];
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(Self::Focus),
            "break" => Ok(Self::Break),
            "work" => Ok(Self::Work),
            _ => Err(ValidationError::InvalidKind {
                value: s.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a session.
///
/// `Active ⇄ Paused` any number of times, then exactly one transition into
/// a terminal state (`Completed` or `Stopped`). Terminal rows are immutable
/// ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Currently running.
    Active,
    /// Temporarily suspended; paused time does not count toward duration.
    Paused,
    /// Ended having met its plan (or having no plan at all).
    Completed,
    /// Ended early, before the planned duration elapsed.
    Stopped,
}

impl SessionStatus {
    /// Returns the string representation for SQL storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
        }
    }

    /// Whether this status is terminal (the session has ended).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "stopped" => Ok(Self::Stopped),
            _ => Err(ValidationError::InvalidStatus {
                value: s.to_string(),
            }),
        }
    }
}

/// One continuous-intent tracked period of work, focus, or break.
///
/// All timestamps are UTC; normalization happens before a `Session` is ever
/// constructed, so comparisons inside the engine are always UTC-to-UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    /// Set exactly once, when the session reaches a terminal status.
    pub end_time: Option<DateTime<Utc>>,
    /// Target length in minutes; absent for open-ended work.
    pub planned_minutes: Option<i64>,
    /// Set on pause, cleared on resume.
    pub paused_at: Option<DateTime<Utc>>,
    /// Refreshed on every pause; only present when `planned_minutes` is.
    pub remaining_minutes: Option<i64>,
    /// Total minutes this session has spent paused so far.
    pub paused_minutes: i64,
    /// UTC calendar day of `start_time`, used for aggregation.
    pub created_date: NaiveDate,
}

impl Session {
    /// Creates a new active session starting at `start_time`.
    #[must_use]
    pub fn begin(
        id: SessionId,
        user_id: UserId,
        kind: SessionKind,
        start_time: DateTime<Utc>,
        planned_minutes: Option<i64>,
    ) -> Self {
        Self {
            id,
            user_id,
            kind,
            status: SessionStatus::Active,
            start_time,
            end_time: None,
            planned_minutes,
            paused_at: None,
            remaining_minutes: None,
            paused_minutes: 0,
            created_date: start_time.date_naive(),
        }
    }

    /// Whether the session has not yet ended.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips() {
        for kind in SessionKind::ALL {
            let parsed: SessionKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn kind_serde_matches_as_str() {
        for kind in SessionKind::ALL {
            let value = serde_json::to_value(kind).unwrap();
            assert_eq!(value.as_str().unwrap(), kind.as_str());
        }
    }

    #[test]
    fn status_round_trips() {
        for status in [
            SessionStatus::Active,
            SessionStatus::Paused,
            SessionStatus::Completed,
            SessionStatus::Stopped,
        ] {
            let parsed: SessionStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(!SessionStatus::Active.is_terminal());
        assert!(!SessionStatus::Paused.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Stopped.is_terminal());
    }

    #[test]
    fn invalid_kind_is_rejected() {
        let err = "nap".parse::<SessionKind>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidKind {
                value: "nap".to_string()
            }
        );
    }

    #[test]
    fn begin_derives_created_date_from_start() {
        let start = "2025-06-01T23:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let session = Session::begin(
            SessionId::new("s1").unwrap(),
            UserId::new("u1").unwrap(),
            SessionKind::Focus,
            start,
            Some(25),
        );
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.created_date.to_string(), "2025-06-01");
        assert!(session.is_open());
        assert_eq!(session.paused_minutes, 0);
    }
}
