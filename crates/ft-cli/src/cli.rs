//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use ft_core::SessionKind;

/// Focus and time tracker.
///
/// Tracks focus, break, and work sessions against planned durations and
/// reports daily totals per kind.
#[derive(Debug, Parser)]
#[command(name = "ft", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this user instead of the configured one.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new session.
    Start {
        /// Session kind: focus, break, or work.
        #[arg(value_parser = parse_kind, default_value = "focus")]
        kind: SessionKind,

        /// Planned duration in minutes.
        #[arg(short, long)]
        minutes: Option<i64>,

        /// Start instant (RFC 3339, any offset); defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Pause the open session.
    Pause {
        /// Session ID; defaults to the current open session.
        #[arg(short, long)]
        session: Option<String>,

        /// Pause instant (RFC 3339, any offset); defaults to now.
        #[arg(long)]
        at: Option<String>,

        /// Override the derived remaining minutes.
        #[arg(short, long)]
        remaining: Option<i64>,
    },

    /// Resume the paused session.
    Resume {
        /// Session ID; defaults to the current open session.
        #[arg(short, long)]
        session: Option<String>,

        /// Override the stored remaining minutes.
        #[arg(short, long)]
        remaining: Option<i64>,
    },

    /// End the open session.
    Stop {
        /// Only stop a session of this kind.
        #[arg(value_parser = parse_kind)]
        kind: Option<SessionKind>,

        /// Session ID; defaults to the current open session.
        #[arg(short, long)]
        session: Option<String>,

        /// End instant (RFC 3339, any offset); defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Show the current session, if any.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show per-kind totals for a day.
    Summary {
        /// UTC date (YYYY-MM-DD); defaults to today.
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn parse_kind(value: &str) -> Result<SessionKind, String> {
    value.parse().map_err(|_| {
        format!("unknown session kind '{value}' (expected focus, break, or work)")
    })
}
