//! Shared helpers for subcommands.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

use ft_core::{Clock, SessionEngine, SessionId, SessionKind, SessionRepository, UserId};

/// Parses an RFC 3339 instant supplied on the command line. Any offset is
/// accepted; the engine normalizes to UTC.
pub(crate) fn parse_at(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid timestamp '{value}' (expected RFC 3339)"))
}

/// Formats an instant for human-readable output.
pub(crate) fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Resolves the session a command addresses: an explicit `--session` ID, or
/// the user's open session (scoped to `kind` when given).
pub(crate) fn resolve_session<R: SessionRepository, C: Clock>(
    engine: &SessionEngine<R, C>,
    user: &UserId,
    session: Option<&str>,
    kind: Option<SessionKind>,
) -> Result<SessionId> {
    if let Some(id) = session {
        return SessionId::new(id).context("invalid session ID");
    }
    let open = match kind {
        Some(kind) => engine.repository().find_open(user, kind)?,
        None => engine.repository().find_open_any(user)?,
    };
    match open {
        Some(session) => Ok(session.id),
        None => match kind {
            Some(kind) => bail!("no open {kind} session for {user}"),
            None => bail!("no open session for {user}"),
        },
    }
}
