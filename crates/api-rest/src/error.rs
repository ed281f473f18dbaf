use api_shared::dto::ErrorRes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_core::{ClinicError, TextError};

/// A non-2xx response with a JSON [`ErrorRes`] body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorRes,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorRes::new(code, message),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Please log in")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        match err {
            ClinicError::InvalidInput(_) | ClinicError::Text(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            ClinicError::DuplicateEmail(_) => {
                Self::new(StatusCode::CONFLICT, "DUPLICATE_EMAIL", err.to_string())
            }
            ClinicError::UnknownPatient(_) => Self::unauthorized(),
            ClinicError::UnknownDoctor(_) => {
                Self::new(StatusCode::NOT_FOUND, "UNKNOWN_DOCTOR", err.to_string())
            }
            ClinicError::Store(_)
            | ClinicError::DoctorFileRead(_)
            | ClinicError::DoctorFileParse(_) => {
                tracing::error!("internal error: {:?}", err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal error",
                )
            }
        }
    }
}

impl From<TextError> for ApiError {
    fn from(err: TextError) -> Self {
        ClinicError::from(err).into()
    }
}
