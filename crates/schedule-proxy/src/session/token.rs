//! Session token generation and lookup on incoming requests.

use axum::http::{header, HeaderMap};
use rand::Rng;

use crate::config::SessionConfig;

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let token: [u8; 32] = rand::rng().random();
    hex::encode(token)
}

/// Token from the configured header, falling back to the configured cookie.
pub fn session_token(headers: &HeaderMap, config: &SessionConfig) -> Option<String> {
    let from_header = headers
        .get(config.token_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == config.token_cookie && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value handing the token to the browser.
pub fn session_cookie(token: &str, config: &SessionConfig) -> String {
    let max_age = config.max_age().num_seconds();
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.token_cookie, token, max_age
    )
}

/// `Set-Cookie` value that removes the token cookie.
pub fn clear_session_cookie(config: &SessionConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.token_cookie
    )
}
