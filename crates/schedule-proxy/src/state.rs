use axum::extract::FromRef;
use schedule_portal::Portal;
use std::sync::Arc;

use crate::config::{SessionConfig, Settings};
use crate::session::SessionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub portal: Arc<dyn Portal>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionStore>, portal: Arc<dyn Portal>, settings: Settings) -> Self {
        Self {
            sessions,
            portal,
            settings: Arc::new(settings),
        }
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.settings.session
    }
}

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
