//! Flat-file persistence for the session map.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use super::store::SessionRecord;

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SessionFile {
    Tokens(HashMap<String, SessionRecord>),
    Single(SessionRecord),
}

/// Read the persisted sessions. `Ok(None)` when the file does not exist.
pub async fn load(path: &Path) -> Result<Option<HashMap<String, SessionRecord>>, PersistError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice::<SessionFile>(&raw)? {
        SessionFile::Tokens(sessions) => Ok(Some(sessions)),
        SessionFile::Single(_) => {
            warn!(
                "{} holds a single tokenless session record, ignoring it",
                path.display()
            );
            Ok(Some(HashMap::new()))
        }
    }
}

/// Write via a sibling temp file and rename, so a crash never leaves a
/// truncated file behind.
pub async fn save(
    path: &Path,
    sessions: &HashMap<String, SessionRecord>,
) -> Result<(), PersistError> {
    let json = serde_json::to_vec_pretty(sessions)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_path(path);
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
