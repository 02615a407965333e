//! Stop command.

use std::io::Write;

use anyhow::Result;

use ft_core::{
    Clock, SessionEngine, SessionKind, SessionRepository, SessionStatus, StopCommand, UserId,
};

use super::util::{parse_at, resolve_session};

pub fn run<R: SessionRepository, C: Clock, W: Write>(
    writer: &mut W,
    engine: &mut SessionEngine<R, C>,
    user: &UserId,
    kind: Option<SessionKind>,
    session: Option<&str>,
    at: Option<&str>,
) -> Result<()> {
    let session_id = resolve_session(engine, user, session, kind)?;
    let end_time = at.map(parse_at).transpose()?;
    let view = engine.stop(StopCommand {
        session_id,
        kind,
        end_time,
    })?;

    let minutes = view.actual_minutes.unwrap_or(0);
    if view.status == SessionStatus::Stopped {
        let planned = view.planned_minutes.unwrap_or(0);
        writeln!(
            writer,
            "Stopped {} session {} early ({minutes} of {planned} planned minutes)",
            view.kind, view.session_id,
        )?;
    } else {
        writeln!(
            writer,
            "Completed {} session {} ({minutes} minutes)",
            view.kind, view.session_id,
        )?;
    }
    Ok(())
}
