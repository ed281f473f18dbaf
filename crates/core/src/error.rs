use clinic_types::{EmailAddress, TextError};

/// Failures of the underlying record store.
///
/// These are not user-correctable and are fatal to the calling operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize records: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize records: {0}")]
    Deserialization(serde_json::Error),
    #[error("record store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] TextError),
    #[error("a patient is already registered with email {0}")]
    DuplicateEmail(EmailAddress),
    #[error("no patient is registered with email {0}")]
    UnknownPatient(EmailAddress),
    #[error("no doctor is listed with email {0}")]
    UnknownDoctor(EmailAddress),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("failed to read doctor directory: {0}")]
    DoctorFileRead(std::io::Error),
    #[error("failed to parse doctor directory: {0}")]
    DoctorFileParse(serde_yaml::Error),
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
