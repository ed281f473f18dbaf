//! Patient registration and login.
//!
//! Credentials are checked by plain equality of the stored and submitted password. There is
//! no hashing, rate limiting or lockout. This matches the behaviour existing accounts were
//! created under and is a known weakness: changing it means migrating stored passwords.

use crate::error::{ClinicError, ClinicResult};
use crate::models::Patient;
use crate::store::RecordStore;
use clinic_types::EmailAddress;
use std::sync::Arc;

/// Pure patient operations - no API concerns
#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn RecordStore<Patient>>,
}

impl PatientService {
    /// Creates a new instance of PatientService over the given patient store.
    pub fn new(patients: Arc<dyn RecordStore<Patient>>) -> Self {
        tracing::warn!("patient passwords are stored and compared as plaintext");
        Self { patients }
    }

    /// Registers a new patient.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError` if:
    /// - a patient with the same email already exists ([`ClinicError::DuplicateEmail`]),
    /// - the password is empty,
    /// - the store fails.
    pub fn register(&self, patient: Patient) -> ClinicResult<()> {
        if patient.password.is_empty() {
            return Err(ClinicError::InvalidInput("password cannot be empty".into()));
        }

        if self.exists_by_email(&patient.email)? {
            tracing::info!("registration rejected, email already in use: {}", patient.email);
            return Err(ClinicError::DuplicateEmail(patient.email));
        }

        let email = patient.email.clone();
        // Conditional insert so two concurrent registrations cannot both win.
        if !self.patients.insert_unless(patient, &|_: &Patient| false)? {
            return Err(ClinicError::DuplicateEmail(email));
        }

        tracing::info!("registered patient {}", email);
        Ok(())
    }

    pub fn exists_by_email(&self, email: &EmailAddress) -> ClinicResult<bool> {
        Ok(self.patients.exists(email)?)
    }

    pub fn find(&self, email: &EmailAddress) -> ClinicResult<Option<Patient>> {
        Ok(self.patients.get_by_id(email)?)
    }

    /// Returns true iff a patient with `email` exists and its stored password equals
    /// `password` byte for byte.
    pub fn validate_login(&self, email: &EmailAddress, password: &str) -> ClinicResult<bool> {
        let ok = match self.patients.get_by_id(email)? {
            Some(patient) => patient.password == password,
            None => false,
        };

        if !ok {
            tracing::info!("failed login for {}", email);
        }

        Ok(ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use clinic_types::NonEmptyText;

    fn service() -> PatientService {
        PatientService::new(Arc::new(InMemoryStore::<Patient>::new()))
    }

    fn patient(email: &str, password: &str) -> Patient {
        Patient {
            email: EmailAddress::parse(email).unwrap(),
            password: password.into(),
            name: NonEmptyText::new("Test Patient").unwrap(),
            phone: Some("0123".into()),
            age: Some(42),
            gender: None,
        }
    }

    #[test]
    fn test_register_then_login() {
        let svc = service();
        svc.register(patient("p@x.com", "Secret1")).expect("register should succeed");

        let email = EmailAddress::parse("p@x.com").unwrap();
        assert!(svc.exists_by_email(&email).unwrap());
        assert!(svc.validate_login(&email, "Secret1").unwrap());
    }

    #[test]
    fn test_login_is_case_sensitive_and_exact() {
        let svc = service();
        svc.register(patient("p@x.com", "Secret1")).unwrap();
        let email = EmailAddress::parse("p@x.com").unwrap();

        assert!(!svc.validate_login(&email, "secret1").unwrap());
        assert!(!svc.validate_login(&email, "Secret1 ").unwrap());
        assert!(!svc.validate_login(&email, "").unwrap());
    }

    #[test]
    fn test_login_unknown_email_is_false() {
        let svc = service();
        let email = EmailAddress::parse("nobody@x.com").unwrap();
        assert!(!svc.validate_login(&email, "anything").unwrap());
    }

    #[test]
    fn test_duplicate_registration_does_not_overwrite() {
        let svc = service();
        svc.register(patient("p@x.com", "first")).unwrap();

        let err = svc
            .register(patient("p@x.com", "second"))
            .expect_err("duplicate should be rejected");
        assert!(matches!(err, ClinicError::DuplicateEmail(_)));

        let email = EmailAddress::parse("p@x.com").unwrap();
        assert!(svc.validate_login(&email, "first").unwrap());
        assert!(!svc.validate_login(&email, "second").unwrap());
    }

    #[test]
    fn test_register_rejects_empty_password() {
        let svc = service();
        let err = svc.register(patient("p@x.com", "")).expect_err("should fail");
        assert!(matches!(err, ClinicError::InvalidInput(_)));
        assert!(svc.find(&EmailAddress::parse("p@x.com").unwrap()).unwrap().is_none());
    }
}
