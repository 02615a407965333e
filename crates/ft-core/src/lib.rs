//! Core domain logic for the focus tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Sessions: the active/paused/completed/stopped state machine
//! - Duration: elapsed-minute math and plan reconciliation
//! - Aggregation: per-kind daily summaries
//!
//! Storage lives behind the [`SessionRepository`] trait; `ft-db` provides
//! the `SQLite` implementation and [`MemoryRepository`] backs tests.

pub mod aggregate;
pub mod clock;
pub mod duration;
pub mod engine;
pub mod error;
pub mod memory;
pub mod repository;
pub mod session;
pub mod types;

pub use aggregate::{DailySummary, KindTotals, daily_summary};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    PauseCommand, ResumeCommand, SessionEngine, SessionView, StartCommand, StopCommand,
};
pub use error::TrackerError;
pub use memory::MemoryRepository;
pub use repository::{SessionRepository, StartOutcome};
pub use session::{Session, SessionKind, SessionStatus};
pub use types::{SessionId, UserId, ValidationError};
