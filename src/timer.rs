use std::time::Duration;

/// Result of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Seconds left after the tick.
    Running(u64),
    /// No time left.
    Expired,
}

/// Countdown of the attempt, in whole seconds.
///
/// There is no pause: the clock starts with the session and only moves
/// down.  It is advisory; the controller decides what expiry means.
#[derive(Debug, Clone)]
pub struct AttemptTimer {
    remaining: u64,
    critical_below: u64,
}

impl AttemptTimer {
    /// A timer starting at `duration`, critical below `critical_below`.
    /// Both are counted in whole seconds.
    pub fn new(duration: Duration, critical_below: Duration) -> Self {
        Self {
            remaining: duration.as_secs(),
            critical_below: critical_below.as_secs(),
        }
    }

    /// Advance the clock by one second.  Stays at zero once reached.
    pub fn tick(&mut self) -> TimerStatus {
        self.remaining = self.remaining.saturating_sub(1);
        self.status()
    }

    /// Running with the seconds left, or expired.
    pub fn status(&self) -> TimerStatus {
        match self.remaining {
            0 => TimerStatus::Expired,
            n => TimerStatus::Running(n),
        }
    }

    /// Seconds left.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Whether the remaining time should be shown as urgent.
    pub fn is_critical(&self) -> bool {
        self.remaining < self.critical_below
    }
}

impl std::fmt::Display for AttemptTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
