use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use clinic_core::{ClinicConfig, ClinicServices, SystemClock};

/// Main entry point for the clinic booking server
///
/// Resolves configuration once, opens the JSON stores and serves the REST API.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_DATA_DIR`: Directory for patient and appointment files (default: "clinic_data")
/// - `CLINIC_DOCTORS_FILE`: YAML doctor directory (default: "doctors.yaml")
/// - `CLINIC_OPEN_TIME`: First bookable time of day (default: "10:00")
/// - `CLINIC_CLOSE_TIME`: Booking cutoff, exclusive (default: "16:00")
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, storage or the listener fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_run=info".parse()?)
                .add_directive("clinic_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CLINIC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = ClinicConfig::from_env_values(
        std::env::var("CLINIC_DATA_DIR").ok(),
        std::env::var("CLINIC_DOCTORS_FILE").ok(),
        std::env::var("CLINIC_OPEN_TIME").ok(),
        std::env::var("CLINIC_CLOSE_TIME").ok(),
    )?;
    tracing::info!(
        "++ Clinic data in {}, doctors from {}, booking {} to {}",
        cfg.data_dir().display(),
        cfg.doctors_file().display(),
        cfg.policy().opens_at(),
        cfg.policy().closes_at()
    );

    let services = ClinicServices::open(&cfg, Arc::new(SystemClock))?;
    tracing::info!("++ Loaded {} doctors", services.booking.doctors().len());

    let app = api_rest::router(AppState::new(services));

    tracing::info!("++ Starting clinic REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}
