//! Booking orchestration.
//!
//! [`BookingService`] ties the validator to the stores:
//!
//! - `book` runs the date/time policy checks, then the conflict scan, and on success
//!   reserves the slot with an atomic conditional insert. A booking either fully persists
//!   or leaves no trace.
//! - `cancel` moves an appointment from `booked` to `cancelled`, scoped to its owner.
//!   Cancelling twice is reported as [`CancelOutcome::AlreadyCancelled`] and writes nothing.
//! - `history` lists every appointment a patient owns, in booking order.
//!
//! Every call takes an explicit [`PatientIdentity`]; this module never consults session
//! state.

use crate::clock::Clock;
use crate::doctors::DoctorDirectory;
use crate::error::{ClinicError, ClinicResult};
use crate::models::{Appointment, AppointmentStatus, Doctor, Patient, PatientIdentity};
use crate::store::RecordStore;
use crate::validation::{validate, BookingPolicy, Verdict};
use chrono::{NaiveDate, NaiveTime};
use clinic_types::EmailAddress;
use std::sync::Arc;

/// What the patient asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingRequest {
    pub doctor_email: EmailAddress,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub problem: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(Appointment),
    Rejected(Verdict),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(Appointment),
    NotFound,
    NotOwner,
    AlreadyCancelled,
}

#[derive(Clone)]
pub struct BookingService {
    policy: BookingPolicy,
    appointments: Arc<dyn RecordStore<Appointment>>,
    patients: Arc<dyn RecordStore<Patient>>,
    doctors: Arc<DoctorDirectory>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    pub fn new(
        policy: BookingPolicy,
        appointments: Arc<dyn RecordStore<Appointment>>,
        patients: Arc<dyn RecordStore<Patient>>,
        doctors: Arc<DoctorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            policy,
            appointments,
            patients,
            doctors,
            clock,
        }
    }

    /// The doctor listing shown on the patient dashboard.
    pub fn doctors(&self) -> &[Doctor] {
        self.doctors.all()
    }

    /// Books an appointment for `identity`.
    ///
    /// # Returns
    ///
    /// [`BookingOutcome::Booked`] with the stored record, or [`BookingOutcome::Rejected`] with
    /// the reason. Rejections have no side effects.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if:
    /// - the identity does not belong to a registered patient ([`ClinicError::UnknownPatient`]),
    /// - the doctor is not in the directory ([`ClinicError::UnknownDoctor`]),
    /// - the store fails.
    pub fn book(
        &self,
        identity: &PatientIdentity,
        request: BookingRequest,
    ) -> ClinicResult<BookingOutcome> {
        if !self.patients.exists(identity.email())? {
            return Err(ClinicError::UnknownPatient(identity.email().clone()));
        }

        let doctor = self
            .doctors
            .find(&request.doctor_email)
            .cloned()
            .ok_or_else(|| ClinicError::UnknownDoctor(request.doctor_email.clone()))?;

        let now = self.clock.now();
        let occupying = self
            .appointments
            .query(&|a: &Appointment| a.occupies(&doctor.email, request.date, request.time))?;
        let verdict = validate(
            &self.policy,
            &doctor.email,
            request.date,
            request.time,
            now.date(),
            now.time(),
            &occupying,
        );
        if !verdict.is_valid() {
            tracing::info!(
                "booking rejected for {} with {} on {} {}: {}",
                identity.email(),
                doctor.email,
                request.date,
                request.time,
                verdict
            );
            return Ok(BookingOutcome::Rejected(verdict));
        }

        let appointment = Appointment {
            id: self.appointments.next_id()?,
            doctor_name: doctor.name.to_string(),
            doctor_specialization: doctor.specialization.to_string(),
            doctor_email: doctor.email.clone(),
            patient_email: identity.email().clone(),
            date: request.date,
            time: request.time,
            problem: request.problem,
            status: AppointmentStatus::Booked,
            created_at: self.clock.now_utc(),
        };

        let (date, time) = (appointment.date, appointment.time);
        let reserved = self.appointments.insert_unless(
            appointment.clone(),
            &|a: &Appointment| a.occupies(&doctor.email, date, time),
        )?;
        if !reserved {
            tracing::warn!(
                "lost race for slot {} on {} {}",
                doctor.email,
                date,
                time
            );
            return Ok(BookingOutcome::Rejected(Verdict::SlotNotAvailable));
        }

        tracing::info!(
            "booked appointment {} for {} with {} on {} {}",
            appointment.id,
            identity.email(),
            doctor.email,
            date,
            time
        );
        Ok(BookingOutcome::Booked(appointment))
    }

    /// Cancels appointment `appointment_id` on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::Store` if the store fails. Every other outcome is reported
    /// through [`CancelOutcome`].
    pub fn cancel(
        &self,
        identity: &PatientIdentity,
        appointment_id: u64,
    ) -> ClinicResult<CancelOutcome> {
        let Some(mut appointment) = self.appointments.get_by_id(&appointment_id)? else {
            return Ok(CancelOutcome::NotFound);
        };

        if &appointment.patient_email != identity.email() {
            tracing::warn!(
                "{} attempted to cancel appointment {} owned by someone else",
                identity.email(),
                appointment_id
            );
            return Ok(CancelOutcome::NotOwner);
        }

        if !appointment.status.can_transition_to(AppointmentStatus::Cancelled) {
            return Ok(CancelOutcome::AlreadyCancelled);
        }

        appointment.status = AppointmentStatus::Cancelled;
        self.appointments.put(appointment.clone())?;

        tracing::info!("cancelled appointment {}", appointment_id);
        Ok(CancelOutcome::Cancelled(appointment))
    }

    /// All appointments owned by `identity`, any status, in booking order.
    pub fn history(&self, identity: &PatientIdentity) -> ClinicResult<Vec<Appointment>> {
        Ok(self.appointments.query_by_owner(identity.email().as_str())?)
    }
}
