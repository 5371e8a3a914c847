// Duplicate-activation guard for the result table
// Remembers the last accepted row and when; a reload starts it over.

use chrono::{DateTime, Duration, Utc};

/// Touchscreens fire a second activation when a finger lingers; repeats of the same row inside this window are dropped.
pub const DUPLICATE_WINDOW_SECS: i64 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationGuard {
    last: Option<(usize, DateTime<Utc>)>,
}

impl ActivationGuard {
    /// True when this activation should go through.
    pub fn accept(&mut self, row: usize, now: DateTime<Utc>) -> bool {
        if let Some((last_row, at)) = self.last {
            if last_row == row && now - at <= Duration::seconds(DUPLICATE_WINDOW_SECS) {
                return false;
            }
        }
        self.last = Some((row, now));
        true
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
