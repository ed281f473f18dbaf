//! Record types for patients, doctors and appointments.

use crate::constants::{APPOINTMENTS_COLLECTION, PATIENTS_COLLECTION};
use crate::store::Record;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clinic_types::{EmailAddress, NonEmptyText};
use serde::{Deserialize, Serialize};

/// A registered patient.
///
/// The password is stored and compared as plaintext; see [`crate::PatientService`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub email: EmailAddress,
    pub password: String,
    pub name: NonEmptyText,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

// Keeps passwords out of log output.
impl std::fmt::Debug for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Patient")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("phone", &self.phone)
            .field("age", &self.age)
            .field("gender", &self.gender)
            .finish()
    }
}

impl Record for Patient {
    type Key = EmailAddress;
    const COLLECTION: &'static str = PATIENTS_COLLECTION;

    fn key(&self) -> EmailAddress {
        self.email.clone()
    }

    fn owner(&self) -> &str {
        self.email.as_str()
    }
}

/// A doctor listed in the clinic directory. Read-only reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: NonEmptyText,
    pub specialization: NonEmptyText,
    pub email: EmailAddress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether an appointment in this status occupies its slot.
    pub fn is_active(&self) -> bool {
        matches!(self, AppointmentStatus::Booked)
    }

    /// Status only moves forward; `Cancelled` is terminal.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Booked, AppointmentStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: u64,
    pub doctor_name: String,
    pub doctor_specialization: String,
    pub doctor_email: EmailAddress,
    pub patient_email: EmailAddress,
    pub date: NaiveDate,
    #[serde(with = "slot_time")]
    pub time: NaiveTime,
    pub problem: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// True if this is an active booking for the given doctor, date and time.
    pub fn occupies(&self, doctor_email: &EmailAddress, date: NaiveDate, time: NaiveTime) -> bool {
        self.status.is_active()
            && &self.doctor_email == doctor_email
            && self.date == date
            && self.time == time
    }
}

impl Record for Appointment {
    type Key = u64;
    const COLLECTION: &'static str = APPOINTMENTS_COLLECTION;

    fn key(&self) -> u64 {
        self.id
    }

    fn owner(&self) -> &str {
        self.patient_email.as_str()
    }
}

/// The authenticated patient on whose behalf an operation runs.
///
/// Produced by the session boundary after login; the core trusts it verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientIdentity {
    email: EmailAddress,
}

impl PatientIdentity {
    pub fn new(email: EmailAddress) -> Self {
        Self { email }
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

/// Appointment times travel as `HH:MM`.
mod slot_time {
    use crate::constants::TIME_FORMAT;
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        crate::validation::parse_time(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: 7,
            doctor_name: "Dr Rao".into(),
            doctor_specialization: "Cardiology".into(),
            doctor_email: EmailAddress::parse("d@x.com").unwrap(),
            patient_email: EmailAddress::parse("p@x.com").unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            problem: "Chest pain".into(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_transitions_only_forward() {
        assert!(AppointmentStatus::Booked.can_transition_to(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Booked));
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Booked.can_transition_to(AppointmentStatus::Booked));
    }

    #[test]
    fn test_cancelled_appointment_does_not_occupy_slot() {
        let doctor = EmailAddress::parse("d@x.com").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();

        assert!(appointment(AppointmentStatus::Booked).occupies(&doctor, date, time));
        assert!(!appointment(AppointmentStatus::Cancelled).occupies(&doctor, date, time));
    }

    #[test]
    fn test_appointment_json_uses_short_time_and_lowercase_status() {
        let json = serde_json::to_value(appointment(AppointmentStatus::Booked)).unwrap();
        assert_eq!(json["time"], "14:00");
        assert_eq!(json["date"], "2024-06-10");
        assert_eq!(json["status"], "booked");
    }

    #[test]
    fn test_patient_debug_hides_password() {
        let patient = Patient {
            email: EmailAddress::parse("p@x.com").unwrap(),
            password: "hunter2".into(),
            name: NonEmptyText::new("Pat").unwrap(),
            phone: None,
            age: None,
            gender: None,
        };
        assert!(!format!("{patient:?}").contains("hunter2"));
    }
}
