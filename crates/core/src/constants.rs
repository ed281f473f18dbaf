//! Constants used throughout the clinic core crate.
//!
//! File names and default business hours live here so that the stores, the
//! configuration layer and the binaries agree on them.

/// Default directory for record storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "clinic_data";

/// Default location of the doctor directory file.
pub const DEFAULT_DOCTORS_FILE: &str = "doctors.yaml";

/// Collection name (and file stem) for patient records.
pub const PATIENTS_COLLECTION: &str = "patients";

/// Collection name (and file stem) for appointment records.
pub const APPOINTMENTS_COLLECTION: &str = "appointments";

/// Extension used by the JSON-file store.
pub const STORE_FILE_EXTENSION: &str = "json";

/// Hour of the earliest bookable time of day (10:00).
pub const DEFAULT_OPENS_AT_HOUR: i64 = 10;

/// Hour of the first time of day that is no longer bookable (16:00), which is also the
/// cutoff after which same-day booking closes.
pub const DEFAULT_CLOSES_AT_HOUR: i64 = 16;

/// Wire format for appointment dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format for appointment times.
pub const TIME_FORMAT: &str = "%H:%M";
