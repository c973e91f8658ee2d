//! Ticker: monotonic-clock gate for the periodic stream tick.
//!
//! The event loop asks [`Ticker::due`] once per iteration instead of
//! relying on a timer signal, so the tick always runs on the loop's own
//! stack and never interrupts rendering.

use std::time::{Duration, Instant};

/// Fires at most once per `interval`.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
    ticks: u64,
}

impl Ticker {
    /// First tick is due one `interval` after `start`.
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            next: start + interval,
            ticks: 0,
        }
    }

    /// Tick period.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Ticks fired so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// True (once) if a tick is due at `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.ticks += 1;
        self.next += self.interval;
        // Behind by more than a period: skip the missed ticks.
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }

    /// Time left until the next tick.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(100);

    #[test]
    fn test_not_due_before_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(PERIOD, start);
        assert!(!ticker.due(start));
        assert!(!ticker.due(start + Duration::from_millis(99)));
        assert_eq!(ticker.remaining(start), PERIOD);
    }

    #[test]
    fn test_fires_once_per_interval() {
        let start = Instant::now();
        let mut ticker = Ticker::new(PERIOD, start);
        let t = start + PERIOD;
        assert!(ticker.due(t));
        assert!(!ticker.due(t));
        assert!(ticker.due(t + PERIOD));
        assert_eq!(ticker.ticks(), 2);
    }

    #[test]
    fn test_catch_up_does_not_burst() {
        let start = Instant::now();
        let mut ticker = Ticker::new(PERIOD, start);
        let late = start + Duration::from_secs(5);
        assert!(ticker.due(late));
        assert!(!ticker.due(late + Duration::from_millis(50)));
        assert!(ticker.due(late + PERIOD));
    }
}
