use chrono::{Duration, Utc};
use dashmap::DashMap;
use schedule_portal::CookieSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::persist::{self, PersistError};
use super::token::generate_token;

/// Cached upstream cookies plus the moment they were obtained (epoch ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub cookies: CookieSet,
    pub timestamp: i64,
}

impl SessionRecord {
    pub fn new(cookies: CookieSet) -> Self {
        Self {
            cookies,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.timestamp).max(0)
    }

    pub fn is_expired(&self, max_age: Duration, now_ms: i64) -> bool {
        now_ms - self.timestamp > max_age.num_milliseconds()
    }
}

/// Token-keyed session map with optional file persistence.
///
/// Expiry is a fixed age from login with no renewal. Expired records are
/// dropped lazily on lookup and in bulk before every flush.
pub struct SessionStore {
    entries: DashMap<String, SessionRecord>,
    max_age: Duration,
    path: Option<PathBuf>,
    dirty: AtomicBool,
    // one writer at a time on the temp file
    flush_lock: Mutex<()>,
}

impl SessionStore {
    /// Empty store.
    pub fn new(max_age: Duration, path: Option<PathBuf>) -> Self {
        Self {
            entries: DashMap::new(),
            max_age,
            path,
            dirty: AtomicBool::new(false),
            flush_lock: Mutex::new(()),
        }
    }

    /// Store seeded from the persisted file. Read failures are logged and
    /// leave the store empty.
    pub async fn open(max_age: Duration, path: Option<PathBuf>) -> Self {
        let store = Self::new(max_age, path);

        let Some(path) = store.path.as_deref() else {
            info!("Session persistence disabled, sessions are memory-only");
            return store;
        };

        match persist::load(path).await {
            Ok(Some(sessions)) => {
                let now = Utc::now().timestamp_millis();
                let total = sessions.len();
                for (token, record) in sessions {
                    if !record.is_expired(max_age, now) {
                        store.entries.insert(token, record);
                    }
                }
                let dropped = total - store.entries.len();
                if dropped > 0 {
                    store.dirty.store(true, Ordering::Relaxed);
                }
                info!(
                    "Loaded {} sessions from {} ({} expired dropped)",
                    store.entries.len(),
                    path.display(),
                    dropped
                );
            }
            Ok(None) => {
                info!("No session file at {}, starting empty", path.display());
            }
            Err(e) => {
                warn!(
                    "Failed to read sessions from {}: {}, starting empty",
                    path.display(),
                    e
                );
            }
        }

        store
    }

    /// Save a fresh session and return its token.
    pub fn put(&self, cookies: CookieSet) -> String {
        let token = generate_token();
        self.entries.insert(token.clone(), SessionRecord::new(cookies));
        self.dirty.store(true, Ordering::Relaxed);
        debug!("Stored new session ({} active)", self.entries.len());
        token
    }

    /// Lookup; an expired record is removed and reported as absent.
    pub fn get(&self, token: &str) -> Option<SessionRecord> {
        let entry = self.entries.get(token)?;
        let record = entry.value().clone();
        drop(entry);

        if record.is_expired(self.max_age, Utc::now().timestamp_millis()) {
            self.remove(token);
            debug!("Session expired, removed from store");
            return None;
        }

        Some(record)
    }

    pub fn remove(&self, token: &str) -> Option<SessionRecord> {
        let removed = self.entries.remove(token).map(|(_, record)| record);
        if removed.is_some() {
            self.dirty.store(true, Ordering::Relaxed);
        }
        removed
    }

    /// Drop every expired record. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp_millis();
        let start_len = self.entries.len();
        self.entries
            .retain(|_, record| !record.is_expired(self.max_age, now));

        let count = start_len.saturating_sub(self.entries.len());
        if count > 0 {
            self.dirty.store(true, Ordering::Relaxed);
            info!("Purged {} expired sessions", count);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn snapshot(&self) -> HashMap<String, SessionRecord> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Write every live session to disk. No-op without a storage path.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let _guard = self.flush_lock.lock().await;
        self.purge_expired();
        self.dirty.store(false, Ordering::Relaxed);
        let sessions = self.snapshot();

        if let Err(e) = persist::save(path, &sessions).await {
            self.dirty.store(true, Ordering::Relaxed);
            return Err(e);
        }

        debug!("Flushed {} sessions to {}", sessions.len(), path.display());
        Ok(())
    }

    /// Flush only when something changed since the last write.
    pub async fn flush_if_dirty(&self) -> Result<bool, PersistError> {
        if !self.dirty.load(Ordering::Relaxed) {
            return Ok(false);
        }
        self.flush().await?;
        Ok(true)
    }

    /// Periodic background flush. Errors are logged and the loop continues.
    pub fn spawn_flush_task(self: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = self.flush_if_dirty().await {
                    warn!("Periodic session flush failed: {}", e);
                }
            }
        })
    }
}
