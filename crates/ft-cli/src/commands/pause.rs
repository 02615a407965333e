//! Pause command.

use std::io::Write;

use anyhow::Result;

use ft_core::{Clock, PauseCommand, SessionEngine, SessionRepository, UserId};

use super::util::{parse_at, resolve_session};

pub fn run<R: SessionRepository, C: Clock, W: Write>(
    writer: &mut W,
    engine: &mut SessionEngine<R, C>,
    user: &UserId,
    session: Option<&str>,
    at: Option<&str>,
    remaining: Option<i64>,
) -> Result<()> {
    let session_id = resolve_session(engine, user, session, None)?;
    let paused_at = at.map(parse_at).transpose()?;
    let view = engine.pause(PauseCommand {
        session_id,
        paused_at,
        remaining_minutes: remaining,
    })?;

    match view.remaining_minutes {
        Some(remaining) => writeln!(
            writer,
            "Paused {} session {} ({remaining} minutes remaining)",
            view.kind, view.session_id,
        )?,
        None => writeln!(writer, "Paused {} session {}", view.kind, view.session_id)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ft_core::{ManualClock, MemoryRepository, SessionKind, StartCommand};

    #[test]
    fn pause_resolves_current_session() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let mut engine = SessionEngine::new(MemoryRepository::new(), &clock);
        let user = UserId::new("sami").unwrap();
        engine
            .start(StartCommand {
                user_id: user.clone(),
                kind: SessionKind::Focus,
                start_time: None,
                planned_minutes: Some(30),
            })
            .unwrap();
        clock.advance(chrono::Duration::minutes(10));

        let mut output = Vec::new();
        run(&mut output, &mut engine, &user, None, None, None).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Paused focus session "));
        assert!(output.contains("(20 minutes remaining)"));
    }

    #[test]
    fn pause_without_open_session_fails() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let mut engine = SessionEngine::new(MemoryRepository::new(), &clock);
        let user = UserId::new("sami").unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut engine, &user, None, None, None).unwrap_err();
        assert!(err.to_string().contains("no open session"));
    }
}
