//! # API REST
//!
//! REST API implementation for the clinic booking system.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Session tokens (resolved per request into an explicit patient identity)
//! - REST-specific concerns (JSON serialization, status codes, CORS)
//!
//! Uses `api-shared` for wire types and sessions, and `clinic-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod handlers;
pub mod session;

use api_shared::dto;
use api_shared::SessionRegistry;
use axum::routing::{get, post};
use axum::Router;
use clinic_core::ClinicServices;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: ClinicServices,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(services: ClinicServices) -> Self {
        Self {
            services,
            sessions: SessionRegistry::new(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::register,
        handlers::login,
        handlers::logout,
        handlers::list_doctors,
        handlers::book_appointment,
        handlers::history,
        handlers::cancel_appointment,
    ),
    components(schemas(
        dto::HealthRes,
        dto::RegisterReq,
        dto::RegisterRes,
        dto::LoginReq,
        dto::LoginRes,
        dto::DoctorRes,
        dto::ListDoctorsRes,
        dto::BookAppointmentReq,
        dto::AppointmentRes,
        dto::HistoryRes,
        dto::ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/doctors", get(handlers::list_doctors))
        .route(
            "/appointments",
            get(handlers::history).post(handlers::book_appointment),
        )
        .route(
            "/appointments/:id/cancel",
            post(handlers::cancel_appointment),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
