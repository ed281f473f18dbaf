//! Doctor directory.
//!
//! Doctors are reference data maintained outside this system. The directory is loaded once
//! from a YAML file at startup:
//!
//! ```yaml
//! - name: Dr Asha Rao
//!   specialization: Cardiology
//!   email: asha.rao@clinic.example
//! ```

use crate::error::{ClinicError, ClinicResult};
use crate::models::Doctor;
use clinic_types::EmailAddress;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>) -> Self {
        Self { doctors }
    }

    /// Loads the directory from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if:
    /// - the file cannot be read ([`ClinicError::DoctorFileRead`]),
    /// - the YAML does not describe a list of doctors ([`ClinicError::DoctorFileParse`]),
    /// - two doctors share an email address.
    pub fn load(path: &Path) -> ClinicResult<Self> {
        let contents = fs::read_to_string(path).map_err(ClinicError::DoctorFileRead)?;
        let directory = Self::parse(&contents)?;
        tracing::info!(
            "loaded {} doctors from {}",
            directory.doctors.len(),
            path.display()
        );
        Ok(directory)
    }

    pub fn parse(yaml: &str) -> ClinicResult<Self> {
        let doctors: Vec<Doctor> =
            serde_yaml::from_str(yaml).map_err(ClinicError::DoctorFileParse)?;

        for (idx, doctor) in doctors.iter().enumerate() {
            if doctors[..idx].iter().any(|d| d.email == doctor.email) {
                return Err(ClinicError::InvalidInput(format!(
                    "duplicate doctor email in directory: {}",
                    doctor.email
                )));
            }
        }

        Ok(Self { doctors })
    }

    /// All doctors, in directory order.
    pub fn all(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn find(&self, email: &EmailAddress) -> Option<&Doctor> {
        self.doctors.iter().find(|d| &d.email == email)
    }
}
