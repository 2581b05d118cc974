use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use schedule_portal::PortalError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::session::session_cookie;
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub session_token: String,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Only rejected credentials are the caller's fault; everything else is a
/// failed login attempt.
fn login_error(error: PortalError) -> ApiError {
    match error {
        PortalError::InvalidCredentials => {
            ApiError::Unauthorized("Invalid username or password".to_string())
        }
        other => ApiError::LoginFailed(other.to_string()),
    }
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (Some(username), Some(password)) = (required(request.username), required(request.password))
    else {
        return Err(ApiError::BadRequest(
            "Username and password are required".to_string(),
        ));
    };

    let cookies = state
        .portal
        .login(&username, &password)
        .await
        .map_err(login_error)?;

    let token = state.sessions.put(cookies);
    info!("Login succeeded, {} active sessions", state.sessions.len());

    let cookie = session_cookie(&token, state.session_config());
    let body = Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        session_token: token,
    });

    Ok(([(header::SET_COOKIE, cookie)], body).into_response())
}
