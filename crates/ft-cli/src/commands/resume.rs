//! Resume command.

use std::io::Write;

use anyhow::Result;

use ft_core::{Clock, ResumeCommand, SessionEngine, SessionRepository, UserId};

use super::util::resolve_session;

pub fn run<R: SessionRepository, C: Clock, W: Write>(
    writer: &mut W,
    engine: &mut SessionEngine<R, C>,
    user: &UserId,
    session: Option<&str>,
    remaining: Option<i64>,
) -> Result<()> {
    let session_id = resolve_session(engine, user, session, None)?;
    let view = engine.resume(ResumeCommand {
        session_id,
        remaining_minutes: remaining,
    })?;

    match view.remaining_minutes {
        Some(remaining) => writeln!(
            writer,
            "Resumed {} session {} ({remaining} minutes remaining)",
            view.kind, view.session_id,
        )?,
        None => writeln!(writer, "Resumed {} session {}", view.kind, view.session_id)?,
    }
    Ok(())
}
