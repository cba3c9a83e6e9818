//! Time sources and timer-owning components.
//!
//! Nothing in this crate spawns threads or OS timers. Components that need a
//! callback later remember the deadline and fire it the next time they are
//! polled; an `EventLoop` (or the host's own loop) does the polling. Time is
//! read through `TimeSource`, so the same code runs against the wall clock or
//! against virtual time in tests.

use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

pub trait TimeSource: fmt::Debug {
    /// time elapsed since the source's epoch
    fn now(&self) -> Duration;

    /// block until `now() >= deadline`
    fn sleep_until(&self, deadline: Duration);
}

/// real time, paced with spin_sleep for sub-millisecond accuracy
#[derive(Debug, Clone, Copy)]
pub struct WallTime {
    epoch: Instant,
}

impl WallTime {
    pub fn new() -> Self {
        WallTime {
            epoch: Instant::now(),
        }
    }
}

impl Default for WallTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallTime {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            spin_sleep::sleep(deadline - now);
        }
    }
}

/// virtual time that only moves when told to; useful for testing
#[derive(Debug, Default)]
pub struct ManualTime {
    now: Cell<Duration>,
}

impl ManualTime {
    pub fn new() -> Self {
        ManualTime {
            now: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// move to `at`; time never runs backwards
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep_until(&self, deadline: Duration) {
        self.set(deadline);
    }
}

/// A component that owns pending timer callbacks.
///
/// `poll` must fire every callback whose deadline is at or before the current
/// time, earliest first, one at a time; afterwards `next_deadline` reports the
/// earliest callback still pending.
pub trait Timed {
    fn next_deadline(&self) -> Option<Duration>;

    fn poll(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_time_advances() {
        let t = ManualTime::new();
        assert_eq!(t.now(), Duration::ZERO);
        t.advance_ms(16);
        t.advance(Duration::from_micros(500));
        assert_eq!(t.now(), Duration::from_micros(16_500));
    }

    #[test]
    fn test_manual_time_sleep_jumps_forward_only() {
        let t = ManualTime::new();
        t.sleep_until(Duration::from_millis(40));
        assert_eq!(t.now(), Duration::from_millis(40));
        t.sleep_until(Duration::from_millis(10));
        assert_eq!(t.now(), Duration::from_millis(40));
    }

    #[test]
    fn test_wall_time_sleeps() {
        let t = WallTime::new();
        let deadline = t.now() + Duration::from_millis(2);
        t.sleep_until(deadline);
        assert!(t.now() >= deadline);
    }
}
