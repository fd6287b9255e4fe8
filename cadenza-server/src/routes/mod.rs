pub mod events;
pub mod users;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use cadenza_core::CadenzaError;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert core errors to HTTP responses
#[derive(Debug)]
pub struct AppError(CadenzaError);

impl From<CadenzaError> for AppError {
    fn from(err: CadenzaError) -> Self {
        Self(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0 {
            CadenzaError::NotFound(_) => StatusCode::NOT_FOUND,
            CadenzaError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CadenzaError::InvalidRecurrence(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CadenzaError::Validation(_) => StatusCode::BAD_REQUEST,
            CadenzaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

/// The `Authorization` header carries the caller's user id.
pub fn requester_id(headers: &HeaderMap) -> Result<Uuid, AppError> {
    headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .ok_or_else(|| {
            AppError(CadenzaError::Unauthorized(
                "missing or malformed Authorization header".to_string(),
            ))
        })
}
