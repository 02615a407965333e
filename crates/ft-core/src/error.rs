//! Error taxonomy surfaced by every engine operation.

use thiserror::Error;

/// Typed failure of a session operation.
///
/// These are the only error shapes the engine ever returns; storage
/// backends map their internal errors into [`TrackerError::Storage`] so no
/// engine-specific exception leaks out. The engine never retries on its
/// own — a `Conflict` is the caller's signal to re-query, not to retry
/// blindly.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A precondition about existing active or paused sessions is violated
    /// (duplicate Start, blocked focus resume).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced session is absent or not in a state the operation
    /// accepts. The idempotent Pause/Resume no-ops are not errors.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed or unnormalizable input, or a negative duration field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The storage backend failed; the surrounding transaction has rolled
    /// back and no session was left in an ambiguous status.
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl TrackerError {
    /// Wraps an arbitrary backend error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = TrackerError::Conflict("already active".to_string());
        assert_eq!(err.to_string(), "conflict: already active");
    }

    #[test]
    fn storage_wraps_source_message() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = TrackerError::storage(io);
        assert_eq!(err.to_string(), "storage error: disk gone");
    }
}
