//! Appointment validation.
//!
//! This module decides whether a requested slot may be booked. [`validate`] is a pure
//! function: it performs no I/O and takes the current date/time and the candidate
//! conflicting appointments as arguments. Cheap date/time policy checks run before the
//! conflict scan.

use crate::constants::{
    DATE_FORMAT, DEFAULT_CLOSES_AT_HOUR, DEFAULT_OPENS_AT_HOUR, TIME_FORMAT,
};
use crate::models::Appointment;
use crate::{ClinicError, ClinicResult};
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use clinic_types::EmailAddress;
use serde::{Deserialize, Serialize};

/// Outcome of validating a booking request.
///
/// Every variant other than [`Verdict::Valid`] is an expected, user-correctable rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Valid,
    PastDate,
    PastTimeToday,
    BookingClosedToday,
    InvalidTime,
    SlotNotAvailable,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    /// Stable wire code.
    pub fn code(&self) -> &'static str {
        match self {
            Verdict::Valid => "VALID",
            Verdict::PastDate => "PAST_DATE",
            Verdict::PastTimeToday => "PAST_TIME_TODAY",
            Verdict::BookingClosedToday => "BOOKING_CLOSED_TODAY",
            Verdict::InvalidTime => "INVALID_TIME",
            Verdict::SlotNotAvailable => "SLOT_NOT_AVAILABLE",
        }
    }

    /// Message shown to the patient. `None` for [`Verdict::Valid`].
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Verdict::Valid => None,
            Verdict::PastDate => Some("You cannot book appointments for past dates."),
            Verdict::PastTimeToday => Some("You cannot book past time slots for today."),
            Verdict::BookingClosedToday => Some("Booking for today is closed (After 4 PM)."),
            Verdict::InvalidTime => Some("Appointments allowed between 10 AM and 4 PM only."),
            Verdict::SlotNotAvailable => {
                Some("This slot is not available. Please choose another time.")
            }
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Business hours for booking.
///
/// A slot time `t` is bookable if `opens_at <= t < closes_at`. The window is continuous
/// rather than a fixed grid of slots. `closes_at` doubles as the same-day cutoff: once the
/// clock reaches it, no more bookings are taken for today.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BookingPolicy {
    opens_at: NaiveTime,
    closes_at: NaiveTime,
}

impl BookingPolicy {
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` unless `opens_at < closes_at`.
    pub fn new(opens_at: NaiveTime, closes_at: NaiveTime) -> ClinicResult<Self> {
        if opens_at >= closes_at {
            return Err(ClinicError::InvalidInput(format!(
                "opening time {} must be before closing time {}",
                opens_at.format(TIME_FORMAT),
                closes_at.format(TIME_FORMAT)
            )));
        }
        Ok(Self {
            opens_at,
            closes_at,
        })
    }

    pub fn opens_at(&self) -> NaiveTime {
        self.opens_at
    }

    pub fn closes_at(&self) -> NaiveTime {
        self.closes_at
    }

    pub fn within_hours(&self, time: NaiveTime) -> bool {
        self.opens_at <= time && time < self.closes_at
    }
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            opens_at: NaiveTime::MIN + Duration::hours(DEFAULT_OPENS_AT_HOUR),
            closes_at: NaiveTime::MIN + Duration::hours(DEFAULT_CLOSES_AT_HOUR),
        }
    }
}

/// Decides whether `doctor_email` can be booked at `requested_date`/`requested_time`.
///
/// Checks run in this order and the first failure wins:
/// 1. date before today → [`Verdict::PastDate`]
/// 2. today, clock at or past the cutoff → [`Verdict::BookingClosedToday`], whatever the
///    requested time
/// 3. today, at or before the current time → [`Verdict::PastTimeToday`]
/// 4. outside business hours → [`Verdict::InvalidTime`]
/// 5. an active booking already holds the slot → [`Verdict::SlotNotAvailable`]
///
/// `existing` may contain any appointments; cancelled ones and other slots are ignored.
#[allow(clippy::too_many_arguments)]
pub fn validate<'a>(
    policy: &BookingPolicy,
    doctor_email: &EmailAddress,
    requested_date: NaiveDate,
    requested_time: NaiveTime,
    current_date: NaiveDate,
    current_time: NaiveTime,
    existing: impl IntoIterator<Item = &'a Appointment>,
) -> Verdict {
    match check_policy(policy, requested_date, requested_time, current_date, current_time) {
        Verdict::Valid => check_slot_free(doctor_email, requested_date, requested_time, existing),
        rejected => rejected,
    }
}

/// Date/time policy checks 1 to 4 of [`validate`], without the conflict scan.
pub fn check_policy(
    policy: &BookingPolicy,
    requested_date: NaiveDate,
    requested_time: NaiveTime,
    current_date: NaiveDate,
    current_time: NaiveTime,
) -> Verdict {
    if requested_date < current_date {
        return Verdict::PastDate;
    }

    if requested_date == current_date {
        if current_time >= policy.closes_at() {
            return Verdict::BookingClosedToday;
        }
        if requested_time <= current_time {
            return Verdict::PastTimeToday;
        }
    }

    if !policy.within_hours(requested_time) {
        return Verdict::InvalidTime;
    }

    Verdict::Valid
}

/// Conflict check 5 of [`validate`].
pub fn check_slot_free<'a>(
    doctor_email: &EmailAddress,
    requested_date: NaiveDate,
    requested_time: NaiveTime,
    existing: impl IntoIterator<Item = &'a Appointment>,
) -> Verdict {
    if existing
        .into_iter()
        .any(|a| a.occupies(doctor_email, requested_date, requested_time))
    {
        return Verdict::SlotNotAvailable;
    }

    Verdict::Valid
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> ClinicResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| {
        ClinicError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", input))
    })
}

/// Parses an `HH:MM` time of day.
///
/// `HH:MM:SS` is accepted only with a zero seconds part: slots are whole minutes, and
/// anything finer would not survive the `HH:MM` storage format.
pub fn parse_time(input: &str) -> ClinicResult<NaiveTime> {
    let invalid =
        || ClinicError::InvalidInput(format!("invalid time '{}', expected HH:MM", input));

    let trimmed = input.trim();
    let time = NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| invalid())?;

    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(invalid());
    }
    Ok(time)
}
