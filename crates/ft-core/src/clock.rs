//! Injectable time source.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Supplies the current instant.
///
/// The engine never calls `Utc::now()` directly; a clock is injected so
/// state transitions are deterministic under test.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. For deterministic tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Starts the clock at an RFC 3339 instant, panicking on a bad literal.
    /// Intended for test fixtures.
    #[must_use]
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339)
            .expect("valid RFC 3339 literal")
            .with_timezone(&Utc);
        Self::new(now)
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now = *now + by;
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}

impl Clock for &ManualClock {
    fn now(&self) -> DateTime<Utc> {
        (*self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let before = clock.now();
        clock.advance(Duration::minutes(25));
        assert_eq!(clock.now() - before, Duration::minutes(25));
    }

    #[test]
    fn manual_clock_sets_absolute_time() {
        let clock = ManualClock::at("2025-06-01T09:00:00Z");
        let target = "2025-06-02T00:00:00Z".parse().unwrap();
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
