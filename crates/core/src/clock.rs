//! Source of "now" for booking decisions.
//!
//! The clinic works in a single reference timezone: the local time of the host. Services
//! take a `Clock` so that date/time policy can be exercised deterministically.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::sync::Mutex;

pub trait Clock: Send + Sync {
    /// Current wall-clock date and time in the clinic's reference timezone.
    fn now(&self) -> NaiveDateTime;

    /// [`Clock::now`] as a UTC instant, for record timestamps.
    ///
    /// A local time skipped by a DST change is taken as UTC.
    fn now_utc(&self) -> DateTime<Utc> {
        let now = self.now();
        Local
            .from_local_datetime(&now)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&now))
    }
}

/// Reads the host's local time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_can_be_moved() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);

        let later = start + chrono::Duration::hours(7);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_now_utc_follows_the_clock() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let clock = FixedClock::new(start);
        let first = clock.now_utc();

        clock.set(start + chrono::Duration::minutes(30));
        assert_eq!(clock.now_utc() - first, chrono::Duration::minutes(30));
        assert_eq!(clock.now_utc().with_timezone(&Local).naive_local(), clock.now());
    }
}
