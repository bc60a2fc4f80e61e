use crate::engine::ExposureError;
use crate::orchestration::OrchestrationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// Well-formed request whose evidence cannot be aggregated.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
}

impl From<OrchestrationError> for AppError {
    fn from(err: OrchestrationError) -> Self {
        let err = match err {
            OrchestrationError::Exposure(e) => return e.into(),
            other => other,
        };
        match &err {
            OrchestrationError::Superseded { .. } => AppError::Conflict(err.to_string()),
            // Forgotten or evicted while the compile was running.
            OrchestrationError::UnknownSession(_) => AppError::Conflict(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<ExposureError> for AppError {
    fn from(err: ExposureError) -> Self {
        AppError::Unprocessable(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
