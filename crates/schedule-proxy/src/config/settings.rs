use anyhow::Result;
use config::{Config, Environment, File};
use schedule_portal::PortalConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub upstream: PortalConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub max_age_days: u32,
    /// Sessions live only in memory when unset.
    pub storage_path: Option<PathBuf>,
    pub flush_interval_seconds: u64,
    pub token_header: String,
    pub token_cookie: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_days: 180,
            storage_path: Some(PathBuf::from("data/sessions.json")),
            flush_interval_seconds: 60,
            token_header: "x-session-token".to_string(),
            token_cookie: "session_token".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.max_age_days))
    }

    /// An empty path disables persistence.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path
            .clone()
            .filter(|path| !path.as_os_str().is_empty())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_seconds.max(1))
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
