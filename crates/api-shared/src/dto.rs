//! Wire types for the clinic APIs.
//!
//! Dates travel as `YYYY-MM-DD`, times as `HH:MM`, and verdicts as their upper-case codes.

use clinic_core::constants::{DATE_FORMAT, TIME_FORMAT};
use clinic_core::{Appointment, Doctor, Verdict};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterReq {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRes {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DoctorRes {
    pub name: String,
    pub specialization: String,
    pub email: String,
}

impl From<&Doctor> for DoctorRes {
    fn from(doctor: &Doctor) -> Self {
        Self {
            name: doctor.name.to_string(),
            specialization: doctor.specialization.to_string(),
            email: doctor.email.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListDoctorsRes {
    pub doctors: Vec<DoctorRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BookAppointmentReq {
    pub doctor_email: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(default)]
    pub problem: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentRes {
    pub id: u64,
    pub doctor_name: String,
    pub doctor_specialization: String,
    pub doctor_email: String,
    pub patient_email: String,
    pub date: String,
    pub time: String,
    pub problem: String,
    /// `booked` or `cancelled`
    pub status: String,
    pub created_at: String,
}

impl From<&Appointment> for AppointmentRes {
    fn from(a: &Appointment) -> Self {
        Self {
            id: a.id,
            doctor_name: a.doctor_name.clone(),
            doctor_specialization: a.doctor_specialization.clone(),
            doctor_email: a.doctor_email.to_string(),
            patient_email: a.patient_email.to_string(),
            date: a.date.format(DATE_FORMAT).to_string(),
            time: a.time.format(TIME_FORMAT).to_string(),
            problem: a.problem.clone(),
            status: a.status.as_str().to_string(),
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryRes {
    pub appointments: Vec<AppointmentRes>,
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub code: String,
    pub message: String,
}

impl ErrorRes {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<Verdict> for ErrorRes {
    fn from(verdict: Verdict) -> Self {
        Self::new(verdict.code(), verdict.message().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{AppointmentStatus, EmailAddress};

    #[test]
    fn test_appointment_res_formats_fields() {
        let appointment = Appointment {
            id: 3,
            doctor_name: "Dr D".into(),
            doctor_specialization: "General".into(),
            doctor_email: EmailAddress::parse("d@x.com").unwrap(),
            patient_email: EmailAddress::parse("p@x.com").unwrap(),
            date: chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            problem: "Rash".into(),
            status: AppointmentStatus::Cancelled,
            created_at: chrono::Utc::now(),
        };

        let res = AppointmentRes::from(&appointment);
        assert_eq!(res.date, "2024-06-10");
        assert_eq!(res.time, "09:30");
        assert_eq!(res.status, "cancelled");
    }

    #[test]
    fn test_error_res_from_verdict() {
        let res = ErrorRes::from(Verdict::PastDate);
        assert_eq!(res.code, "PAST_DATE");
        assert_eq!(res.message, "You cannot book appointments for past dates.");
    }
}
