use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::session::{clear_session_cookie, session_token};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// GET /api/session
pub async fn session_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let record = session_token(&headers, state.session_config())
        .and_then(|token| state.sessions.get(&token));

    match record {
        Some(record) => {
            let age = record.age_ms(Utc::now().timestamp_millis());
            debug!("Session check: authenticated, age {} ms", age);
            (
                StatusCode::OK,
                Json(SessionStatus {
                    authenticated: true,
                    session_age: Some(age),
                    timestamp: Some(record.timestamp),
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(SessionStatus {
                authenticated: false,
                session_age: None,
                timestamp: None,
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let config = state.session_config();
    let removed = session_token(&headers, config)
        .and_then(|token| state.sessions.remove(&token))
        .is_some();

    if removed {
        info!("Session logged out");
    }

    (
        [(header::SET_COOKIE, clear_session_cookie(config))],
        Json(LogoutResponse {
            success: true,
            message: "Logged out".to_string(),
        }),
    )
        .into_response()
}
