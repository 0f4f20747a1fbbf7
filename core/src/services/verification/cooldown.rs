//! Resend cooldown derived from a challenge's issue time

use chrono::{DateTime, Duration, Utc};

/// Fixed cooldown policy
#[derive(Debug, Clone, Copy)]
pub struct CooldownClock {
    duration: Duration,
}

impl CooldownClock {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Cooldown window opened by an issuance at `issued_at`
    pub fn window_for(&self, issued_at: DateTime<Utc>) -> CooldownWindow {
        CooldownWindow {
            next_resend_allowed_at: issued_at + self.duration,
        }
    }

    /// Whole seconds until a resend is allowed, floor 0
    pub fn remaining(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        self.window_for(issued_at).remaining(now)
    }
}

/// Earliest instant a resend may contact any channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownWindow {
    pub next_resend_allowed_at: DateTime<Utc>,
}

impl CooldownWindow {
    /// Seconds left, rounded up so callers never retry a moment too early
    pub fn remaining(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.next_resend_allowed_at - now).num_milliseconds();
        if millis <= 0 {
            0
        } else {
            ((millis + 999) / 1000) as u64
        }
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) == 0
    }
}
