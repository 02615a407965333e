//! Summary command for daily per-kind totals.

use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use ft_core::{Clock, SessionEngine, SessionRepository, UserId, daily_summary};

pub fn run<R: SessionRepository, C: Clock, W: Write>(
    writer: &mut W,
    engine: &SessionEngine<R, C>,
    user: &UserId,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = daily_summary(engine.repository(), user, date)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &summary)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Summary for {} ({})", summary.date, summary.user_id)?;
    for (kind, totals) in &summary.kinds {
        writeln!(
            writer,
            "- {kind}: {} minutes ({} sessions, {} completed)",
            totals.minutes, totals.sessions, totals.completed,
        )?;
    }
    writeln!(writer, "Total: {} minutes", summary.total_minutes)?;
    Ok(())
}
