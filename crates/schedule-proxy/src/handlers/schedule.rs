use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};

use crate::session::session_token;
use crate::state::AppState;
use crate::utils::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub date: Option<String>,
}

fn requested_date(query: &ScheduleQuery) -> Result<NaiveDate, ApiError> {
    match query.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw))),
        None => Ok(Local::now().date_naive()),
    }
}

/// GET /api/schedule?date=YYYY-MM-DD
///
/// Relays the upstream body as-is. An upstream 401 drops the cached session.
pub async fn schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = session_token(&headers, state.session_config())
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated, please log in".to_string()))?;

    let record = state.sessions.get(&token).ok_or_else(|| {
        ApiError::SessionExpired("Session not found or expired, please log in again".to_string())
    })?;

    let date = requested_date(&query)?;

    let upstream = match state.portal.fetch_classes(&record.cookies, date).await {
        Ok(upstream) => upstream,
        Err(e) if e.is_session_rejected() => {
            warn!("Upstream rejected cached session, removing it");
            state.sessions.remove(&token);
            return Err(ApiError::SessionExpired(
                "Upstream session expired, please log in again".to_string(),
            ));
        }
        Err(e) => return Err(ApiError::ScheduleFailed(e.to_string())),
    };

    info!("Schedule for {} relayed ({} bytes)", date, upstream.body.len());

    let content_type = upstream
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        upstream.body,
    )
        .into_response())
}
