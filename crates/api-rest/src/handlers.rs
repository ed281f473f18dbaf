//! Request handlers.
//!
//! Handlers translate wire types into core calls and core outcomes into status codes.
//! Booking rejections are `422` with the verdict code in the body.

use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::AppState;
use api_shared::dto::{
    AppointmentRes, BookAppointmentReq, DoctorRes, ErrorRes, HealthRes, HistoryRes,
    ListDoctorsRes, LoginReq, LoginRes, RegisterReq, RegisterRes,
};
use api_shared::HealthService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use clinic_core::validation::{parse_date, parse_time};
use clinic_core::{
    BookingOutcome, BookingRequest, CancelOutcome, EmailAddress, NonEmptyText, Patient,
};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Patient registered", body = RegisterRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 409, description = "Email already registered", body = ErrorRes)
    )
)]
/// Register a new patient account
///
/// # Errors
/// Returns `409 Conflict` if the email is already registered and `400 Bad Request` for
/// malformed input.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> ApiResult<(StatusCode, Json<RegisterRes>)> {
    let patient = Patient {
        email: EmailAddress::parse(&req.email)?,
        password: req.password,
        name: NonEmptyText::new(&req.name)?,
        phone: req.phone.filter(|p| !p.trim().is_empty()),
        age: req.age,
        gender: req.gender.filter(|g| !g.trim().is_empty()),
    };
    let email = patient.email.to_string();

    state.services.patients.register(patient)?;

    Ok((StatusCode::CREATED, Json(RegisterRes { email })))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Logged in", body = LoginRes),
        (status = 401, description = "Invalid credentials", body = ErrorRes)
    )
)]
/// Log in and receive a session token
///
/// The token must be sent in the `x-session-token` header on every session-gated call.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> ApiResult<Json<LoginRes>> {
    let invalid = || {
        ApiError::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "Invalid email or password",
        )
    };

    let email = EmailAddress::parse(&req.email).map_err(|_| invalid())?;
    if !state.services.patients.validate_login(&email, &req.password)? {
        return Err(invalid());
    }

    let token = state.sessions.issue(email.clone());
    Ok(Json(LoginRes {
        token,
        email: email.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/logout",
    params(("x-session-token" = String, Header, description = "Session token from /login")),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "No live session", body = ErrorRes)
    )
)]
/// End the current session
pub async fn logout(State(state): State<AppState>, session: Session) -> StatusCode {
    state.sessions.revoke(&session.token);
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/doctors",
    params(("x-session-token" = String, Header, description = "Session token from /login")),
    responses(
        (status = 200, description = "Doctor directory", body = ListDoctorsRes),
        (status = 401, description = "No live session", body = ErrorRes)
    )
)]
/// List all doctors (patient dashboard)
pub async fn list_doctors(
    State(state): State<AppState>,
    _session: Session,
) -> Json<ListDoctorsRes> {
    let doctors = state
        .services
        .booking
        .doctors()
        .iter()
        .map(DoctorRes::from)
        .collect();
    Json(ListDoctorsRes { doctors })
}

#[utoipa::path(
    post,
    path = "/appointments",
    params(("x-session-token" = String, Header, description = "Session token from /login")),
    request_body = BookAppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentRes),
        (status = 400, description = "Malformed date, time or email", body = ErrorRes),
        (status = 401, description = "No live session", body = ErrorRes),
        (status = 404, description = "Unknown doctor", body = ErrorRes),
        (status = 422, description = "Booking rejected; code is the verdict", body = ErrorRes)
    )
)]
/// Book an appointment for the logged-in patient
///
/// # Errors
/// Returns `422 Unprocessable Entity` with one of `PAST_DATE`, `PAST_TIME_TODAY`,
/// `BOOKING_CLOSED_TODAY`, `INVALID_TIME` or `SLOT_NOT_AVAILABLE` when the slot cannot be
/// booked.
pub async fn book_appointment(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<BookAppointmentReq>,
) -> ApiResult<(StatusCode, Json<AppointmentRes>)> {
    let request = BookingRequest {
        doctor_email: EmailAddress::parse(&req.doctor_email)?,
        date: parse_date(&req.date)?,
        time: parse_time(&req.time)?,
        problem: req.problem,
    };

    match state.services.booking.book(&session.identity, request)? {
        BookingOutcome::Booked(appointment) => Ok((
            StatusCode::CREATED,
            Json(AppointmentRes::from(&appointment)),
        )),
        BookingOutcome::Rejected(verdict) => Err(ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorRes::from(verdict),
        }),
    }
}

#[utoipa::path(
    get,
    path = "/appointments",
    params(("x-session-token" = String, Header, description = "Session token from /login")),
    responses(
        (status = 200, description = "Booking history, any status", body = HistoryRes),
        (status = 401, description = "No live session", body = ErrorRes)
    )
)]
/// Booking history of the logged-in patient
pub async fn history(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<HistoryRes>> {
    let appointments = state
        .services
        .booking
        .history(&session.identity)?
        .iter()
        .map(AppointmentRes::from)
        .collect();
    Ok(Json(HistoryRes { appointments }))
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    params(
        ("id" = u64, Path, description = "Appointment id"),
        ("x-session-token" = String, Header, description = "Session token from /login")
    ),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentRes),
        (status = 401, description = "No live session", body = ErrorRes),
        (status = 403, description = "Appointment belongs to another patient", body = ErrorRes),
        (status = 404, description = "No such appointment", body = ErrorRes),
        (status = 409, description = "Appointment already cancelled", body = ErrorRes)
    )
)]
/// Cancel one of the logged-in patient's appointments
pub async fn cancel_appointment(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<u64>,
) -> ApiResult<Json<AppointmentRes>> {
    match state.services.booking.cancel(&session.identity, id)? {
        CancelOutcome::Cancelled(appointment) => Ok(Json(AppointmentRes::from(&appointment))),
        CancelOutcome::NotFound => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "No such appointment",
        )),
        CancelOutcome::NotOwner => Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "NOT_OWNER",
            "You can only cancel your own appointments",
        )),
        CancelOutcome::AlreadyCancelled => Err(ApiError::new(
            StatusCode::CONFLICT,
            "ALREADY_CANCELLED",
            "Appointment is already cancelled",
        )),
    }
}

#[cfg(test)]
mod tests {
    use crate::{router, AppState};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use clinic_core::validation::{parse_date, parse_time};
    use clinic_core::{BookingPolicy, ClinicServices, DoctorDirectory, FixedClock};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let now = parse_date("2024-06-10")
            .unwrap()
            .and_time(parse_time("09:00").unwrap());
        let doctors = DoctorDirectory::parse(
            "- name: Dr D\n  specialization: General Practice\n  email: d@x.com\n",
        )
        .unwrap();
        let clock = Arc::new(FixedClock::new(now));
        let services = ClinicServices::in_memory(BookingPolicy::default(), doctors, clock);
        router(AppState::new(services))
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("x-session-token", token);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register_and_login(app: &Router, email: &str) -> String {
        let (status, _) = call(
            app,
            "POST",
            "/register",
            None,
            Some(json!({"email": email, "password": "pw", "name": "Pat"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = call(
            app,
            "POST",
            "/login",
            None,
            Some(json!({"email": email, "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    fn booking(time: &str) -> Value {
        json!({"doctor_email": "d@x.com", "date": "2024-06-10", "time": time, "problem": "Cough"})
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app(), "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = app();
        register_and_login(&app, "p@x.com").await;
        let (status, body) = call(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({"email": "p@x.com", "password": "other", "name": "Pat"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE_EMAIL");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = app();
        register_and_login(&app, "p@x.com").await;
        let (status, body) = call(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({"email": "p@x.com", "password": "PW"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_session_gated_routes_require_token() {
        let app = app();
        let (status, _) = call(&app, "GET", "/doctors", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = call(&app, "GET", "/appointments", Some("bogus"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_book_history_cancel_flow() {
        let app = app();
        let token = register_and_login(&app, "p@x.com").await;

        let (status, body) = call(&app, "GET", "/doctors", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["doctors"][0]["email"], "d@x.com");

        let (status, booked) =
            call(&app, "POST", "/appointments", Some(&token), Some(booking("14:00"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(booked["status"], "booked");
        assert_eq!(booked["time"], "14:00");

        let (status, body) =
            call(&app, "POST", "/appointments", Some(&token), Some(booking("14:00"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "SLOT_NOT_AVAILABLE");

        let (status, body) =
            call(&app, "POST", "/appointments", Some(&token), Some(booking("17:00"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_TIME");
        assert_eq!(body["message"], "Appointments allowed between 10 AM and 4 PM only.");

        let id = booked["id"].as_u64().unwrap();
        let uri = format!("/appointments/{id}/cancel");
        let (status, body) = call(&app, "POST", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "cancelled");

        let (status, body) = call(&app, "POST", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ALREADY_CANCELLED");

        let (status, body) = call(&app, "GET", "/appointments", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let appointments = body["appointments"].as_array().unwrap();
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0]["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_cancel_by_other_patient_is_forbidden() {
        let app = app();
        let owner = register_and_login(&app, "p@x.com").await;
        let other = register_and_login(&app, "q@x.com").await;

        let (_, booked) =
            call(&app, "POST", "/appointments", Some(&owner), Some(booking("11:00"))).await;
        let uri = format!("/appointments/{}/cancel", booked["id"].as_u64().unwrap());

        let (status, body) = call(&app, "POST", &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "NOT_OWNER");

        let (status, _) = call(&app, "POST", "/appointments/999/cancel", Some(&owner), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_date_is_bad_request() {
        let app = app();
        let token = register_and_login(&app, "p@x.com").await;
        let (status, body) = call(
            &app,
            "POST",
            "/appointments",
            Some(&token),
            Some(json!({"doctor_email": "d@x.com", "date": "10/06/2024", "time": "11:00"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_time_with_seconds_cannot_take_a_booked_slot() {
        let app = app();
        let token = register_and_login(&app, "p@x.com").await;

        let (status, _) =
            call(&app, "POST", "/appointments", Some(&token), Some(booking("14:00"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            call(&app, "POST", "/appointments", Some(&token), Some(booking("14:00:30"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");

        let (status, body) =
            call(&app, "POST", "/appointments", Some(&token), Some(booking("14:00:00"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "SLOT_NOT_AVAILABLE");
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let app = app();
        let token = register_and_login(&app, "p@x.com").await;

        let (status, _) = call(&app, "POST", "/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, "GET", "/appointments", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
