//! Start command.

use std::io::Write;

use anyhow::Result;

use ft_core::{Clock, SessionEngine, SessionKind, SessionRepository, StartCommand, UserId};

use super::util::{format_time, parse_at};

pub fn run<R: SessionRepository, C: Clock, W: Write>(
    writer: &mut W,
    engine: &mut SessionEngine<R, C>,
    user: &UserId,
    kind: SessionKind,
    minutes: Option<i64>,
    at: Option<&str>,
) -> Result<()> {
    let start_time = at.map(parse_at).transpose()?;
    let view = engine.start(StartCommand {
        user_id: user.clone(),
        kind,
        start_time,
        planned_minutes: minutes,
    })?;

    match view.planned_minutes {
        Some(planned) => writeln!(
            writer,
            "Started {} session {} at {} ({planned} minutes planned)",
            view.kind,
            view.session_id,
            format_time(view.start_time),
        )?,
        None => writeln!(
            writer,
            "Started {} session {} at {}",
            view.kind,
            view.session_id,
            format_time(view.start_time),
        )?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ft_core::{ManualClock, MemoryRepository};

    #[test]
    fn start_reports_session_and_plan() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let mut engine = SessionEngine::new(MemoryRepository::new(), &clock);
        let user = UserId::new("sami").unwrap();

        let mut output = Vec::new();
        run(
            &mut output,
            &mut engine,
            &user,
            SessionKind::Focus,
            Some(25),
            None,
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Started focus session "));
        assert!(output.contains("at 2025-06-01T09:00:00Z (25 minutes planned)"));
    }

    #[test]
    fn start_conflict_surfaces_as_error() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let mut engine = SessionEngine::new(MemoryRepository::new(), &clock);
        let user = UserId::new("sami").unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut engine, &user, SessionKind::Focus, None, None).unwrap();
        let err = run(&mut output, &mut engine, &user, SessionKind::Focus, None, None)
            .unwrap_err();
        assert!(err.to_string().contains("already has an active focus session"));
    }

    #[test]
    fn start_rejects_malformed_timestamp() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let mut engine = SessionEngine::new(MemoryRepository::new(), &clock);
        let user = UserId::new("sami").unwrap();

        let mut output = Vec::new();
        let err = run(
            &mut output,
            &mut engine,
            &user,
            SessionKind::Focus,
            None,
            Some("yesterday"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }
}
