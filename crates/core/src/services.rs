//! Wiring of the core services over a shared set of stores.

use crate::booking::BookingService;
use crate::clock::Clock;
use crate::config::ClinicConfig;
use crate::doctors::DoctorDirectory;
use crate::error::ClinicResult;
use crate::models::{Appointment, Patient};
use crate::patient::PatientService;
use crate::store::{InMemoryStore, JsonFileStore, RecordStore};
use crate::validation::BookingPolicy;
use std::sync::Arc;

/// Patient and booking services sharing one patient store.
#[derive(Clone)]
pub struct ClinicServices {
    pub patients: PatientService,
    pub booking: BookingService,
}

impl ClinicServices {
    /// Opens the JSON-file stores under the configured data directory and loads the doctor
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if the doctor directory cannot be loaded or either store cannot
    /// be opened.
    pub fn open(cfg: &ClinicConfig, clock: Arc<dyn Clock>) -> ClinicResult<Self> {
        let doctors = DoctorDirectory::load(cfg.doctors_file())?;
        let patients: Arc<dyn RecordStore<Patient>> =
            Arc::new(JsonFileStore::<Patient>::open(cfg.data_dir())?);
        let appointments: Arc<dyn RecordStore<Appointment>> =
            Arc::new(JsonFileStore::<Appointment>::open(cfg.data_dir())?);

        Ok(Self::with_stores(
            cfg.policy(),
            patients,
            appointments,
            doctors,
            clock,
        ))
    }

    /// Services backed by fresh in-memory stores.
    pub fn in_memory(
        policy: BookingPolicy,
        doctors: DoctorDirectory,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_stores(
            policy,
            Arc::new(InMemoryStore::<Patient>::new()),
            Arc::new(InMemoryStore::<Appointment>::new()),
            doctors,
            clock,
        )
    }

    pub fn with_stores(
        policy: BookingPolicy,
        patients: Arc<dyn RecordStore<Patient>>,
        appointments: Arc<dyn RecordStore<Appointment>>,
        doctors: DoctorDirectory,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients: PatientService::new(patients.clone()),
            booking: BookingService::new(
                policy,
                appointments,
                patients,
                Arc::new(doctors),
                clock,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_open_shares_patient_store_between_services() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let doctors_file = temp_dir.path().join("doctors.yaml");
        fs::write(
            &doctors_file,
            "- name: Dr D\n  specialization: General\n  email: d@x.com\n",
        )
        .unwrap();

        let cfg = ClinicConfig::new(
            temp_dir.path().join("data"),
            doctors_file,
            BookingPolicy::default(),
        )
        .unwrap();
        let services =
            ClinicServices::open(&cfg, Arc::new(SystemClock)).expect("open should succeed");

        assert_eq!(services.booking.doctors().len(), 1);
        assert!(cfg.data_dir().is_dir(), "data dir should be created");
    }
}
