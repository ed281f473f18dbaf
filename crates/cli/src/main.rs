use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use clinic_core::constants::{DATE_FORMAT, TIME_FORMAT};
use clinic_core::validation::{parse_date, parse_time};
use clinic_core::{
    Appointment, BookingOutcome, BookingRequest, CancelOutcome, ClinicConfig, ClinicServices,
    EmailAddress, NonEmptyText, Patient, PatientIdentity, SystemClock,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic appointment booking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new patient
    Register {
        email: String,
        password: String,
        /// Full name
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Check a patient's credentials
    Login { email: String, password: String },
    /// List all doctors
    Doctors,
    /// Book an appointment
    Book {
        /// Patient email
        #[arg(long)]
        patient: String,
        /// Patient password
        #[arg(long)]
        password: String,
        /// Doctor email
        #[arg(long)]
        doctor: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Time (HH:MM)
        #[arg(long)]
        time: String,
        #[arg(long, default_value = "")]
        problem: String,
    },
    /// Show a patient's booking history
    History {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        password: String,
    },
    /// Cancel an appointment
    Cancel {
        #[arg(long)]
        patient: String,
        #[arg(long)]
        password: String,
        /// Appointment id
        id: u64,
    },
}

/// Builds services over the JSON stores, configured from the environment.
///
/// # Environment Variables
/// - `CLINIC_DATA_DIR`: directory for patient and appointment files (default: "clinic_data")
/// - `CLINIC_DOCTORS_FILE`: YAML doctor directory (default: "doctors.yaml")
/// - `CLINIC_OPEN_TIME` / `CLINIC_CLOSE_TIME`: booking hours (default: 10:00 to 16:00)
fn open_services() -> anyhow::Result<ClinicServices> {
    let cfg = ClinicConfig::from_env_values(
        std::env::var("CLINIC_DATA_DIR").ok(),
        std::env::var("CLINIC_DOCTORS_FILE").ok(),
        std::env::var("CLINIC_OPEN_TIME").ok(),
        std::env::var("CLINIC_CLOSE_TIME").ok(),
    )?;
    let services = ClinicServices::open(&cfg, Arc::new(SystemClock))
        .with_context(|| format!("opening clinic data in {}", cfg.data_dir().display()))?;
    Ok(services)
}

fn identify(
    services: &ClinicServices,
    email: &str,
    password: &str,
) -> anyhow::Result<PatientIdentity> {
    let email = EmailAddress::parse(email)?;
    if !services.patients.validate_login(&email, password)? {
        bail!("Invalid email or password");
    }
    Ok(PatientIdentity::new(email))
}

fn print_appointment(a: &Appointment) {
    println!(
        "#{} {} {} with {} ({}) - {} [{}]",
        a.id,
        a.date.format(DATE_FORMAT),
        a.time.format(TIME_FORMAT),
        a.doctor_name,
        a.doctor_specialization,
        a.problem,
        a.status
    );
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let services = open_services()?;

    match command {
        Commands::Register {
            email,
            password,
            name,
            phone,
            age,
            gender,
        } => {
            let patient = Patient {
                email: EmailAddress::parse(&email)?,
                password,
                name: NonEmptyText::new(&name)?,
                phone,
                age,
                gender,
            };
            services.patients.register(patient)?;
            println!("Registration successful: {}", email);
        }
        Commands::Login { email, password } => {
            identify(&services, &email, &password)?;
            println!("Login successful: {}", email);
        }
        Commands::Doctors => {
            let doctors = services.booking.doctors();
            if doctors.is_empty() {
                println!("No doctors found.");
            }
            for doctor in doctors {
                println!(
                    "{} - {} <{}>",
                    doctor.name, doctor.specialization, doctor.email
                );
            }
        }
        Commands::Book {
            patient,
            password,
            doctor,
            date,
            time,
            problem,
        } => {
            let identity = identify(&services, &patient, &password)?;
            let request = BookingRequest {
                doctor_email: EmailAddress::parse(&doctor)?,
                date: parse_date(&date)?,
                time: parse_time(&time)?,
                problem,
            };
            match services.booking.book(&identity, request)? {
                BookingOutcome::Booked(appointment) => {
                    println!("Appointment booked:");
                    print_appointment(&appointment);
                }
                BookingOutcome::Rejected(verdict) => bail!("{}", verdict),
            }
        }
        Commands::History { patient, password } => {
            let identity = identify(&services, &patient, &password)?;
            let appointments = services.booking.history(&identity)?;
            if appointments.is_empty() {
                println!("No appointments found.");
            }
            for appointment in &appointments {
                print_appointment(appointment);
            }
        }
        Commands::Cancel {
            patient,
            password,
            id,
        } => {
            let identity = identify(&services, &patient, &password)?;
            match services.booking.cancel(&identity, id)? {
                CancelOutcome::Cancelled(appointment) => {
                    println!("Appointment cancelled:");
                    print_appointment(&appointment);
                }
                CancelOutcome::NotFound => bail!("No appointment with id {}", id),
                CancelOutcome::NotOwner => bail!("You can only cancel your own appointments"),
                CancelOutcome::AlreadyCancelled => bail!("Appointment {} is already cancelled", id),
            }
        }
    }

    Ok(())
}
