//! Storage layer for the focus tracker.
//!
//! Provides persistence for sessions using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`SessionStore`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A store can be moved between threads but cannot be shared
//! without external synchronization. Concurrent *processes* are safe: the
//! single-active-session guarantee is enforced inside the database, not in
//! process memory.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC form (e.g.
//! `2025-06-01T09:00:00.000Z`), so lexicographic ordering matches
//! chronological ordering and range queries can compare strings directly.
//!
//! ## Single Active Session
//!
//! A partial unique index on `(user_id, kind) WHERE status = 'active'`
//! backs the check-then-insert transaction in
//! [`SessionStore::insert_if_no_active`]. Even if a second process races
//! past the check, the index rejects the duplicate row.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use ft_core::{
    Session, SessionId, SessionKind, SessionRepository, SessionStatus, StartOutcome,
    TrackerError, UserId,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for session {session_id}: {value}")]
    TimestampParse {
        session_id: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored column holds a value the domain types reject.
    #[error("invalid field for session {session_id}: {message}")]
    InvalidField { session_id: String, message: String },
}

impl From<DbError> for TrackerError {
    fn from(err: DbError) -> Self {
        Self::storage(err)
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct SessionStore {
    conn: Connection,
}

const SESSION_COLUMNS: &str = "id, user_id, kind, status, start_time, end_time, \
     planned_minutes, paused_at, remaining_minutes, paused_minutes, created_date";

impl SessionStore {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Sessions table: one row per tracked session
            -- start_time/end_time/paused_at: RFC 3339 UTC text
            -- created_date: the UTC date of start_time, for daily roll-ups
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                status TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                planned_minutes INTEGER,
                paused_at TEXT,
                remaining_minutes INTEGER,
                paused_minutes INTEGER NOT NULL DEFAULT 0,
                created_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user_start
                ON sessions(user_id, start_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_user_kind
                ON sessions(user_id, kind, start_time);

            -- Backstop for the at-most-one-active invariant.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_active
                ON sessions(user_id, kind) WHERE status = 'active';
            ",
        )?;
        Ok(())
    }

    /// Inserts a session unless an active one of the same kind exists for
    /// the user. The check and insert run in one transaction.
    pub fn insert_if_no_active(&mut self, session: &Session) -> Result<StartOutcome, DbError> {
        let tx = self.conn.transaction()?;
        let active: i64 = tx.query_row(
            "SELECT COUNT(*) FROM sessions WHERE user_id = ? AND kind = ? AND status = ?",
            params![
                session.user_id.as_str(),
                session.kind.as_str(),
                SessionStatus::Active.as_str(),
            ],
            |row| row.get(0),
        )?;
        if active > 0 {
            return Ok(StartOutcome::ActiveExists);
        }
        let result = tx.execute(
            &format!("INSERT INTO sessions ({SESSION_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            params![
                session.id.as_str(),
                session.user_id.as_str(),
                session.kind.as_str(),
                session.status.as_str(),
                format_timestamp(session.start_time),
                session.end_time.map(format_timestamp),
                session.planned_minutes,
                session.paused_at.map(format_timestamp),
                session.remaining_minutes,
                session.paused_minutes,
                session.created_date.format("%Y-%m-%d").to_string(),
            ],
        );
        match result {
            Ok(_) => {}
            // A concurrent writer slipped in between our check and insert;
            // the partial unique index turned it into a conflict.
            Err(err) if is_unique_violation(&err) => return Ok(StartOutcome::ActiveExists),
            Err(err) => return Err(err.into()),
        }
        tx.commit()?;
        Ok(StartOutcome::Created)
    }

    /// Fetches a session by ID.
    pub fn get(&self, id: &SessionId) -> Result<Option<Session>, DbError> {
        self.query_one(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?"),
            params![id.as_str()],
        )
    }

    /// The active session for `(user, kind)`, if any.
    pub fn find_active(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, DbError> {
        self.query_one(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE user_id = ? AND kind = ? AND status = ?
                 ORDER BY start_time DESC, id DESC LIMIT 1"
            ),
            params![user.as_str(), kind.as_str(), SessionStatus::Active.as_str()],
        )
    }

    /// The most recently started open (active or paused) session for
    /// `(user, kind)`.
    pub fn find_open(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, DbError> {
        self.query_one(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE user_id = ? AND kind = ? AND end_time IS NULL
                 ORDER BY start_time DESC, id DESC LIMIT 1"
            ),
            params![user.as_str(), kind.as_str()],
        )
    }

    /// The most recently started open session for the user, any kind.
    pub fn find_open_any(&self, user: &UserId) -> Result<Option<Session>, DbError> {
        self.query_one(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE user_id = ? AND end_time IS NULL
                 ORDER BY start_time DESC, id DESC LIMIT 1"
            ),
            params![user.as_str()],
        )
    }

    /// The most recently started session of a kind, regardless of state.
    pub fn find_most_recent(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, DbError> {
        self.query_one(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE user_id = ? AND kind = ?
                 ORDER BY start_time DESC, id DESC LIMIT 1"
            ),
            params![user.as_str(), kind.as_str()],
        )
    }

    /// Sessions whose start falls within `[start, end)`, ordered by start.
    pub fn list_in_range(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE user_id = ? AND start_time >= ? AND start_time < ?
             ORDER BY start_time ASC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![
                user.as_str(),
                format_timestamp(start),
                format_timestamp(end)
            ],
            session_row,
        )?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(decode_session(row?)?);
        }
        Ok(sessions)
    }

    /// Compare-and-swap on the session's status: rewrites the mutable
    /// columns only if the stored status still matches `expected`.
    pub fn update_if_status(
        &mut self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, DbError> {
        let changed = self.conn.execute(
            "UPDATE sessions
             SET status = ?, end_time = ?, paused_at = ?,
                 remaining_minutes = ?, paused_minutes = ?
             WHERE id = ? AND status = ?",
            params![
                session.status.as_str(),
                session.end_time.map(format_timestamp),
                session.paused_at.map(format_timestamp),
                session.remaining_minutes,
                session.paused_minutes,
                session.id.as_str(),
                expected.as_str(),
            ],
        )?;
        if changed == 0 {
            tracing::debug!(session = %session.id, expected = %expected, "status swap missed");
        }
        Ok(changed == 1)
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<Session>, DbError> {
        let row = self
            .conn
            .query_row(sql, params, session_row)
            .optional()?;
        row.map(decode_session).transpose()
    }
}

impl SessionRepository for SessionStore {
    fn insert_if_no_active(&mut self, session: &Session) -> Result<StartOutcome, TrackerError> {
        Ok(Self::insert_if_no_active(self, session)?)
    }

    fn get(&self, id: &SessionId) -> Result<Option<Session>, TrackerError> {
        Ok(Self::get(self, id)?)
    }

    fn find_active(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError> {
        Ok(Self::find_active(self, user, kind)?)
    }

    fn find_open(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError> {
        Ok(Self::find_open(self, user, kind)?)
    }

    fn find_open_any(&self, user: &UserId) -> Result<Option<Session>, TrackerError> {
        Ok(Self::find_open_any(self, user)?)
    }

    fn find_most_recent(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<Session>, TrackerError> {
        Ok(Self::find_most_recent(self, user, kind)?)
    }

    fn list_in_range(
        &self,
        user: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, TrackerError> {
        Ok(Self::list_in_range(self, user, start, end)?)
    }

    fn update_if_status(
        &mut self,
        session: &Session,
        expected: SessionStatus,
    ) -> Result<bool, TrackerError> {
        Ok(Self::update_if_status(self, session, expected)?)
    }
}

/// Raw row before domain validation.
struct SessionRow {
    id: String,
    user_id: String,
    kind: String,
    status: String,
    start_time: String,
    end_time: Option<String>,
    planned_minutes: Option<i64>,
    paused_at: Option<String>,
    remaining_minutes: Option<i64>,
    paused_minutes: i64,
    created_date: String,
}

fn session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        status: row.get(3)?,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        planned_minutes: row.get(6)?,
        paused_at: row.get(7)?,
        remaining_minutes: row.get(8)?,
        paused_minutes: row.get(9)?,
        created_date: row.get(10)?,
    })
}

fn decode_session(row: SessionRow) -> Result<Session, DbError> {
    let invalid = |message: String| DbError::InvalidField {
        session_id: row.id.clone(),
        message,
    };
    let id = SessionId::new(&row.id).map_err(|err| invalid(err.to_string()))?;
    let user_id = UserId::new(&row.user_id).map_err(|err| invalid(err.to_string()))?;
    let kind: SessionKind = row.kind.parse().map_err(|err: ft_core::ValidationError| {
        invalid(err.to_string())
    })?;
    let status: SessionStatus = row
        .status
        .parse()
        .map_err(|err: ft_core::ValidationError| invalid(err.to_string()))?;
    let start_time = parse_timestamp(&row.start_time, &row.id)?;
    let end_time = row
        .end_time
        .as_deref()
        .map(|value| parse_timestamp(value, &row.id))
        .transpose()?;
    let paused_at = row
        .paused_at
        .as_deref()
        .map(|value| parse_timestamp(value, &row.id))
        .transpose()?;
    let created_date = NaiveDate::parse_from_str(&row.created_date, "%Y-%m-%d").map_err(
        |source| DbError::TimestampParse {
            session_id: row.id.clone(),
            value: row.created_date.clone(),
            source,
        },
    )?;
    Ok(Session {
        id,
        user_id,
        kind,
        status,
        start_time,
        end_time,
        planned_minutes: row.planned_minutes,
        paused_at,
        remaining_minutes: row.remaining_minutes,
        paused_minutes: row.paused_minutes,
        created_date,
    })
}

fn parse_timestamp(value: &str, session_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            session_id: session_id.to_string(),
            value: value.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
