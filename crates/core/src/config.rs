//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Request handling never reads process-wide environment variables; the binaries read them
//! and hand the raw values to the helpers in this module.

use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_DOCTORS_FILE};
use crate::validation::{parse_time, BookingPolicy};
use crate::{ClinicError, ClinicResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClinicConfig {
    data_dir: PathBuf,
    doctors_file: PathBuf,
    policy: BookingPolicy,
}

impl ClinicConfig {
    /// Create a new `ClinicConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if `data_dir` is empty.
    pub fn new(
        data_dir: PathBuf,
        doctors_file: PathBuf,
        policy: BookingPolicy,
    ) -> ClinicResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(ClinicError::InvalidInput(
                "data directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            data_dir,
            doctors_file,
            policy,
        })
    }

    /// Build a `ClinicConfig` from raw environment values.
    ///
    /// Missing or blank values fall back to [`DEFAULT_DATA_DIR`], [`DEFAULT_DOCTORS_FILE`]
    /// and the default booking hours.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if a booking hour cannot be parsed or the hours
    /// are inverted.
    pub fn from_env_values(
        data_dir: Option<String>,
        doctors_file: Option<String>,
        opens_at: Option<String>,
        closes_at: Option<String>,
    ) -> ClinicResult<Self> {
        let data_dir = non_blank(data_dir).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let doctors_file =
            non_blank(doctors_file).unwrap_or_else(|| DEFAULT_DOCTORS_FILE.to_string());
        let policy = booking_policy_from_env_values(opens_at, closes_at)?;

        Self::new(PathBuf::from(data_dir), PathBuf::from(doctors_file), policy)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn doctors_file(&self) -> &Path {
        &self.doctors_file
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }
}

/// Build the booking policy from optional `HH:MM` strings.
///
/// Missing or blank values fall back to the clinic defaults (10:00 to 16:00).
///
/// # Errors
///
/// Returns `ClinicError::InvalidInput` if a value cannot be parsed as a time, or if the
/// opening time is not before the closing time.
pub fn booking_policy_from_env_values(
    opens_at: Option<String>,
    closes_at: Option<String>,
) -> ClinicResult<BookingPolicy> {
    let defaults = BookingPolicy::default();
    let opens_at = match non_blank(opens_at) {
        Some(value) => parse_time(&value)?,
        None => defaults.opens_at(),
    };
    let closes_at = match non_blank(closes_at) {
        Some(value) => parse_time(&value)?,
        None => defaults.closes_at(),
    };

    BookingPolicy::new(opens_at, closes_at)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
