//! Upstream portal configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PortalConfig {
    /// Scheme and host of the portal; relative redirects resolve against it.
    pub base_url: String,
    pub find_account_path: String,
    pub login_page_path: String,
    pub login_submit_path: String,
    pub schedule_page_path: String,
    pub classes_path: String,
    /// Cookie whose presence proves a successful login.
    pub auth_cookie: String,
    /// Overrides the location id otherwise taken from the first scraped branch.
    pub location_id: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub find_account_attempts: u32,
    pub login_redirect_limit: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://portal.example.com".to_string(),
            find_account_path: "/Account/FindAccount".to_string(),
            login_page_path: "/Account/Login".to_string(),
            login_submit_path: "/Account/Login".to_string(),
            schedule_page_path: "/Schedule".to_string(),
            classes_path: "/api/schedule/classes".to_string(),
            auth_cookie: ".ASPXAUTH".to_string(),
            location_id: None,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            timeout_seconds: 30,
            find_account_attempts: 3,
            login_redirect_limit: 5,
        }
    }
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}
