//! # Clinic Core
//!
//! Core business logic for the clinic appointment booking system.
//!
//! This crate contains pure data operations:
//! - Patient registration and credential checks
//! - The doctor directory
//! - Appointment validation (date/time policy and slot conflicts)
//! - Booking, cancellation and history over keyed record stores
//!
//! **No API concerns**: sessions, HTTP servers and rendering belong in `api-shared`,
//! `api-rest` and the CLI. Callers pass an explicit [`PatientIdentity`] into every booking
//! operation.

pub mod booking;
pub mod clock;
pub mod config;
pub mod constants;
pub mod doctors;
pub mod error;
pub mod models;
pub mod patient;
pub mod services;
pub mod store;
pub mod validation;

pub use booking::{BookingOutcome, BookingRequest, BookingService, CancelOutcome};
pub use clinic_types::{EmailAddress, NonEmptyText, TextError};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ClinicConfig;
pub use constants::{DEFAULT_DATA_DIR, DEFAULT_DOCTORS_FILE};
pub use doctors::DoctorDirectory;
pub use error::{ClinicError, ClinicResult, StoreError, StoreResult};
pub use models::{Appointment, AppointmentStatus, Doctor, Patient, PatientIdentity};
pub use patient::PatientService;
pub use services::ClinicServices;
pub use store::{InMemoryStore, JsonFileStore, Record, RecordStore};
pub use validation::{validate, BookingPolicy, Verdict};
