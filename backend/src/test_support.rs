//! Test utilities for the lotkeeper crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`), which
//! enable the `test-support` feature.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock whose current instant is set and advanced by the test.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use lotkeeper::test_support::MutableClock;
/// use mockable::Clock;
///
/// let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
/// let clock = MutableClock::new(start);
/// clock.advance_seconds(90 * 60);
/// assert_eq!((clock.utc() - start).num_minutes(), 90);
/// ```
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *self.lock_clock() += delta;
    }

    /// Move the clock by `seconds`, which may be negative.
    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock_clock() = now;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
