//! Accelerated page scrolling.

use std::time::{Duration, Instant};

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward older output.
    Up,
    /// Toward newer output.
    Down,
}

/// Scroll distance that grows while the same page key keeps arriving.
///
/// The first step moves `base` rows. Each further step in the same
/// direction adds `increment`, up to `max`. A direction change or a gap
/// longer than `pause` starts over.
#[derive(Debug, Clone)]
pub struct ScrollAccel {
    base: f64,
    increment: f64,
    pause: Duration,
    rate: f64,
    last: Option<(Direction, Instant)>,
}

impl ScrollAccel {
    /// New accelerator.
    pub const fn new(base: f64, increment: f64, pause: Duration) -> Self {
        Self {
            base,
            increment,
            pause,
            rate: base,
            last: None,
        }
    }

    /// Rows to move for a page key pressed at `now`, at most `max`.
    pub fn step(&mut self, direction: Direction, now: Instant, max: usize) -> usize {
        let max_rate = max.max(1) as f64;
        let continuing = matches!(
            self.last,
            Some((d, at)) if d == direction && now.saturating_duration_since(at) <= self.pause
        );
        if continuing {
            if self.rate < max_rate {
                self.rate += self.increment;
            }
        } else {
            self.rate = self.base;
        }
        self.last = Some((direction, now));

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rows = self.rate.min(max_rate).ceil() as usize;
        rows.max(1)
    }

    /// Forget the previous step.
    pub fn reset(&mut self) {
        self.rate = self.base;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accel() -> ScrollAccel {
        ScrollAccel::new(5.0, 2.0, Duration::from_millis(250))
    }

    #[test]
    fn test_same_direction_accelerates() {
        let mut scroll = accel();
        let t = Instant::now();
        assert_eq!(scroll.step(Direction::Up, t, 100), 5);
        assert_eq!(scroll.step(Direction::Up, t + Duration::from_millis(50), 100), 7);
        assert_eq!(scroll.step(Direction::Up, t + Duration::from_millis(100), 100), 9);
    }

    #[test]
    fn test_direction_change_resets() {
        let mut scroll = accel();
        let t = Instant::now();
        scroll.step(Direction::Up, t, 100);
        scroll.step(Direction::Up, t, 100);
        assert_eq!(scroll.step(Direction::Down, t, 100), 5);
    }

    #[test]
    fn test_pause_resets() {
        let mut scroll = accel();
        let t = Instant::now();
        scroll.step(Direction::Down, t, 100);
        assert_eq!(scroll.step(Direction::Down, t + Duration::from_secs(1), 100), 5);
    }

    #[test]
    fn test_capped_at_max() {
        let mut scroll = accel();
        let t = Instant::now();
        let mut last = 0;
        for _ in 0..20 {
            last = scroll.step(Direction::Up, t, 12);
        }
        assert_eq!(last, 12);
        assert_eq!(accel().step(Direction::Up, t, 3), 3);
    }
}
