use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("Schedule fetch failed: {0}")]
    ScheduleFailed(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BadRequest", msg)
            }
            ApiError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized", msg)
            }
            ApiError::SessionExpired(msg) => {
                tracing::warn!("Session expired: {}", msg);
                (StatusCode::UNAUTHORIZED, "SessionExpired", msg)
            }
            ApiError::LoginFailed(msg) => {
                tracing::error!("Login failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "LoginFailed", msg)
            }
            ApiError::ScheduleFailed(msg) => {
                tracing::error!("Schedule fetch failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "ScheduleFailed", msg)
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
