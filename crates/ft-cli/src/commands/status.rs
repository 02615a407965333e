//! Status command for showing the current session.

use std::io::Write;

use anyhow::Result;

use ft_core::{Clock, SessionEngine, SessionKind, SessionRepository, SessionStatus, UserId};

use super::util::format_time;

pub fn run<R: SessionRepository, C: Clock, W: Write>(
    writer: &mut W,
    engine: &SessionEngine<R, C>,
    user: &UserId,
    json: bool,
) -> Result<()> {
    let current = engine.current(user)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &current)?;
        writeln!(writer)?;
        return Ok(());
    }

    match current {
        None => writeln!(writer, "No open session for {user}")?,
        Some(view) => {
            writeln!(writer, "Current session: {} ({})", view.kind, view.status)?;
            writeln!(writer, "ID:        {}", view.session_id)?;
            writeln!(writer, "Started:   {}", format_time(view.start_time))?;
            if let Some(planned) = view.planned_minutes {
                writeln!(writer, "Planned:   {planned} minutes")?;
            }
            if view.status == SessionStatus::Paused {
                if let Some(paused_at) = view.paused_at {
                    writeln!(writer, "Paused at: {}", format_time(paused_at))?;
                }
                if let Some(remaining) = view.remaining_minutes {
                    writeln!(writer, "Remaining: {remaining} minutes")?;
                }
            }
        }
    }

    // The widget line: the latest clocked work session, even if it ended.
    if let Some(work) = engine.most_recent(user, SessionKind::Work)? {
        match work.actual_minutes {
            Some(minutes) => writeln!(
                writer,
                "Last work: {} at {} ({minutes} minutes)",
                work.status,
                format_time(work.start_time),
            )?,
            None => writeln!(
                writer,
                "Last work: {} at {}",
                work.status,
                format_time(work.start_time),
            )?,
        }
    }
    Ok(())
}
