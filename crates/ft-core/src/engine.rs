//! The session state machine.
//!
//! States: `active ⇄ paused` (any number of cycles) with a single
//! transition into terminal `completed`/`stopped`; direct
//! `active → terminal` is also valid. Every operation loads the relevant
//! session(s) through the repository, validates its preconditions, and
//! persists the new state through a conditional write — there is no
//! in-process "current session" cache, so the machine stays correct under
//! concurrent processes.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::clock::Clock;
use crate::duration::{self, elapsed_minutes};
use crate::error::TrackerError;
use crate::repository::{SessionRepository, StartOutcome};
use crate::session::{Session, SessionKind, SessionStatus};
use crate::types::{SessionId, UserId};

/// Start a new session.
#[derive(Debug, Clone)]
pub struct StartCommand {
    pub user_id: UserId,
    pub kind: SessionKind,
    /// Explicit start instant; defaults to the clock's now.
    pub start_time: Option<DateTime<FixedOffset>>,
    pub planned_minutes: Option<i64>,
}

/// Pause an active session.
#[derive(Debug, Clone)]
pub struct PauseCommand {
    pub session_id: SessionId,
    pub paused_at: Option<DateTime<FixedOffset>>,
    /// Caller-supplied remaining minutes, overriding the derived value.
    pub remaining_minutes: Option<i64>,
}

/// Resume a paused session.
#[derive(Debug, Clone)]
pub struct ResumeCommand {
    pub session_id: SessionId,
    pub remaining_minutes: Option<i64>,
}

/// End an open session.
#[derive(Debug, Clone)]
pub struct StopCommand {
    pub session_id: SessionId,
    /// Expected kind, when the caller addresses a kind-scoped endpoint.
    pub kind: Option<SessionKind>,
    pub end_time: Option<DateTime<FixedOffset>>,
}

/// Result view returned by every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub kind: SessionKind,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub planned_minutes: Option<i64>,
    pub actual_minutes: Option<i64>,
    pub paused_at: Option<DateTime<Utc>>,
    pub remaining_minutes: Option<i64>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
            kind: session.kind,
            status: session.status,
            start_time: session.start_time,
            end_time: session.end_time,
            planned_minutes: session.planned_minutes,
            actual_minutes: duration::actual_duration(session),
            paused_at: session.paused_at,
            remaining_minutes: session.remaining_minutes,
        }
    }
}

/// Validates and applies session commands against a repository and a clock.
///
/// Holds no state of its own and no lock beyond the scope of one
/// operation; linearization per `(user, kind)` comes from the repository's
/// conditional writes.
pub struct SessionEngine<R, C> {
    repo: R,
    clock: C,
}

impl<R: SessionRepository, C: Clock> SessionEngine<R, C> {
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Read access to the underlying repository, for the aggregator.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Starts a new session, failing with `Conflict` if an active session
    /// of the same kind already exists for the user.
    pub fn start(&mut self, cmd: StartCommand) -> Result<SessionView, TrackerError> {
        if let Some(planned) = cmd.planned_minutes {
            if planned < 0 {
                return Err(TrackerError::InvalidInput(format!(
                    "planned_minutes must be non-negative, got {planned}"
                )));
            }
        }
        let start_time = cmd
            .start_time
            .map_or_else(|| self.clock.now(), normalize_utc);

        let session = Session::begin(
            SessionId::generate(),
            cmd.user_id,
            cmd.kind,
            start_time,
            cmd.planned_minutes,
        );
        match self.repo.insert_if_no_active(&session)? {
            StartOutcome::Created => {
                tracing::debug!(
                    session = %session.id,
                    user = %session.user_id,
                    kind = %session.kind,
                    "session started"
                );
                Ok(SessionView::from(&session))
            }
            StartOutcome::ActiveExists => Err(TrackerError::Conflict(format!(
                "user {} already has an active {} session",
                session.user_id, session.kind
            ))),
        }
    }

    /// Pauses an active session. Pausing an already-paused session is an
    /// idempotent no-op returning the stored state.
    pub fn pause(&mut self, cmd: PauseCommand) -> Result<SessionView, TrackerError> {
        let session = self.load(&cmd.session_id)?;
        match session.status {
            SessionStatus::Paused => return Ok(SessionView::from(&session)),
            SessionStatus::Active => {}
            _ => {
                return Err(TrackerError::NotFound(format!(
                    "session {} is {}, not pausable",
                    session.id, session.status
                )));
            }
        }
        check_remaining_override(cmd.remaining_minutes, &session)?;

        let paused_at = cmd
            .paused_at
            .map_or_else(|| self.clock.now(), normalize_utc);
        let mut updated = session.clone();
        updated.status = SessionStatus::Paused;
        updated.paused_at = Some(paused_at);
        updated.remaining_minutes = cmd
            .remaining_minutes
            .or_else(|| duration::remaining_after_pause(&session, paused_at));

        if self.repo.update_if_status(&updated, SessionStatus::Active)? {
            tracing::debug!(session = %updated.id, "session paused");
            return Ok(SessionView::from(&updated));
        }
        // Lost the write race; a concurrent pause winning is still an
        // idempotent success.
        let current = self.load(&cmd.session_id)?;
        if current.status == SessionStatus::Paused {
            Ok(SessionView::from(&current))
        } else {
            Err(TrackerError::NotFound(format!(
                "session {} is {}, not pausable",
                current.id, current.status
            )))
        }
    }

    /// Resumes a paused session. Resuming an already-active session is an
    /// idempotent no-op.
    pub fn resume(&mut self, cmd: ResumeCommand) -> Result<SessionView, TrackerError> {
        let session = self.load(&cmd.session_id)?;
        match session.status {
            SessionStatus::Active => return Ok(SessionView::from(&session)),
            SessionStatus::Paused => {}
            _ => {
                return Err(TrackerError::NotFound(format!(
                    "session {} is {}, not resumable",
                    session.id, session.status
                )));
            }
        }
        self.check_break_blocks_focus_resume(&session)?;
        check_remaining_override(cmd.remaining_minutes, &session)?;

        let now = self.clock.now();
        let mut updated = session.clone();
        if let Some(paused_at) = updated.paused_at.take() {
            updated.paused_minutes += elapsed_minutes(paused_at, now);
        }
        updated.status = SessionStatus::Active;
        if cmd.remaining_minutes.is_some() {
            updated.remaining_minutes = cmd.remaining_minutes;
        }

        if self.repo.update_if_status(&updated, SessionStatus::Paused)? {
            tracing::debug!(session = %updated.id, "session resumed");
            return Ok(SessionView::from(&updated));
        }
        let current = self.load(&cmd.session_id)?;
        if current.status == SessionStatus::Active {
            Ok(SessionView::from(&current))
        } else {
            Err(TrackerError::NotFound(format!(
                "session {} is {}, not resumable",
                current.id, current.status
            )))
        }
    }

    /// Ends an open session, classifying it as completed or stopped early.
    pub fn stop(&mut self, cmd: StopCommand) -> Result<SessionView, TrackerError> {
        let session = self.load(&cmd.session_id)?;
        if let Some(kind) = cmd.kind {
            if session.kind != kind {
                return Err(TrackerError::NotFound(format!(
                    "no open {kind} session with ID {}",
                    cmd.session_id
                )));
            }
        }
        if !session.is_open() {
            return Err(TrackerError::NotFound(format!(
                "session {} has already ended",
                session.id
            )));
        }

        let requested_end = cmd.end_time.map_or_else(|| self.clock.now(), normalize_utc);
        let end = if requested_end < session.start_time {
            // Data-quality anomaly: clamp instead of persisting a negative
            // duration.
            tracing::warn!(
                session = %session.id,
                start = %session.start_time,
                end = %requested_end,
                "end time precedes start time, clamping to start"
            );
            session.start_time
        } else {
            requested_end
        };

        let mut updated = session.clone();
        if updated.status == SessionStatus::Paused {
            if let Some(paused_at) = updated.paused_at {
                updated.paused_minutes += elapsed_minutes(paused_at, end);
            }
        }
        updated.end_time = Some(end);
        let active = duration::active_elapsed_minutes(&updated, end);
        updated.status = match updated.planned_minutes {
            Some(planned) if active < planned => SessionStatus::Stopped,
            _ => SessionStatus::Completed,
        };

        if self.repo.update_if_status(&updated, session.status)? {
            tracing::debug!(
                session = %updated.id,
                status = %updated.status,
                "session ended"
            );
            Ok(SessionView::from(&updated))
        } else {
            // A concurrent transition won; the caller should re-query.
            Err(TrackerError::NotFound(format!(
                "session {} changed state concurrently",
                session.id
            )))
        }
    }

    /// The user's most recently started open session, any kind.
    pub fn current(&self, user: &UserId) -> Result<Option<SessionView>, TrackerError> {
        Ok(self
            .repo
            .find_open_any(user)?
            .as_ref()
            .map(SessionView::from))
    }

    /// The latest session of a kind for the user, regardless of state.
    pub fn most_recent(
        &self,
        user: &UserId,
        kind: SessionKind,
    ) -> Result<Option<SessionView>, TrackerError> {
        Ok(self
            .repo
            .find_most_recent(user, kind)?
            .as_ref()
            .map(SessionView::from))
    }

    /// Policy: an open break session (active or paused) blocks resuming a
    /// focus session — the break must be ended first. Intentionally
    /// asymmetric; it is not a general cross-kind exclusivity rule.
    fn check_break_blocks_focus_resume(&self, session: &Session) -> Result<(), TrackerError> {
        if session.kind != SessionKind::Focus {
            return Ok(());
        }
        if let Some(brk) = self.repo.find_open(&session.user_id, SessionKind::Break)? {
            return Err(TrackerError::Conflict(format!(
                "break session {} is still {}; end it before resuming focus",
                brk.id, brk.status
            )));
        }
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Session, TrackerError> {
        self.repo
            .get(id)?
            .ok_or_else(|| TrackerError::NotFound(format!("no session with ID {id}")))
    }
}

/// Normalizes an externally supplied timestamp to UTC at the boundary.
/// Only UTC-to-UTC comparisons happen past this point.
fn normalize_utc(ts: DateTime<FixedOffset>) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

/// A caller-supplied remaining value must be non-negative and only makes
/// sense for sessions with a plan.
fn check_remaining_override(
    remaining: Option<i64>,
    session: &Session,
) -> Result<(), TrackerError> {
    let Some(remaining) = remaining else {
        return Ok(());
    };
    if remaining < 0 {
        return Err(TrackerError::InvalidInput(format!(
            "remaining_minutes must be non-negative, got {remaining}"
        )));
    }
    if session.planned_minutes.is_none() {
        return Err(TrackerError::InvalidInput(
            "remaining_minutes requires a planned duration".to_string(),
        ));
    }
    Ok(())
}
