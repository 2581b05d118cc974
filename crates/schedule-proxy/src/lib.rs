//! # Schedule Proxy
//!
//! Personal proxy in front of a third-party scheduling portal. Logs in on the
//! user's behalf, caches the portal cookies under an opaque session token,
//! and relays the portal's class list to the browser.

pub mod config;
pub mod handlers;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod utils;

use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.settings.server.static_dir);

    let api_routes = Router::new()
        .route("/api/session", get(handlers::session::session_status))
        .route("/api/login", post(handlers::login::login))
        .route("/api/logout", post(handlers::session::logout))
        .route("/api/schedule", get(handlers::schedule::schedule));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api_routes)
        .fallback_service(static_files)
        .with_state(state)
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        // Tracing
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
