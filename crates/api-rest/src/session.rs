use crate::error::ApiError;
use crate::AppState;
use api_shared::auth::SESSION_HEADER;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clinic_core::PatientIdentity;

/// The logged-in patient behind a request.
///
/// Extracted from the `x-session-token` header; requests without a live token are
/// rejected with `401`.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: String,
    pub identity: PatientIdentity,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::unauthorized)?;

        let identity = state
            .sessions
            .resolve(token)
            .ok_or_else(ApiError::unauthorized)?;

        Ok(Session {
            token: token.to_string(),
            identity,
        })
    }
}
