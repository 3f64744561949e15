//! Injectable wall clock.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Always returns the same instant
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Advances by `step_ms` on every read.
///
/// Lets timeout behaviour be tested without sleeping.
#[derive(Debug)]
pub struct SteppingClock {
    current: Cell<i64>,
    step_ms: i64,
}

impl SteppingClock {
    pub fn new(start: i64, step_ms: i64) -> Self {
        Self {
            current: Cell::new(start),
            step_ms,
        }
    }
}

impl Clock for SteppingClock {
    fn now_millis(&self) -> i64 {
        let now = self.current.get();
        self.current.set(now + self.step_ms);
        now
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}
