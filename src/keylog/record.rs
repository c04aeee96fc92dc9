//! Session log record and its on-disk format.
//!
//! ```json
//! {
//!   "date": "01-03-2024",
//!   "duration": [0, 12, 41],
//!   "total_count": 1532,
//!   "keylog": { "a": 97, "esc": 5, "space": 240 }
//! }
//! ```

use crate::core::histogram::Histogram;
use crate::core::summary::ElapsedTime;
use crate::core::tracker::FinishedSession;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Date format stored in the `date` field.
const DATE_FORMAT: &str = "%d-%m-%Y";

/// Timestamp format used in log file names.
const FILE_STAMP_FORMAT: &str = "%m%d%Y_%H%M%S";

const FILE_PREFIX: &str = "record_";

/// One session as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLog {
    /// Session start date (local time)
    pub date: String,
    /// Elapsed time as `[hours, minutes, seconds]`
    pub duration: ElapsedTime,
    pub total_count: u64,
    pub keylog: Histogram,
}

impl SessionLog {
    pub fn from_session(session: &FinishedSession) -> Self {
        Self {
            date: session
                .summary
                .started_at
                .with_timezone(&Local)
                .format(DATE_FORMAT)
                .to_string(),
            duration: session.summary.elapsed,
            total_count: session.summary.total_count,
            keylog: session.histogram.clone(),
        }
    }

    /// File name for a session that started at `started_at`.
    pub fn file_name(started_at: DateTime<Utc>) -> String {
        format!(
            "{FILE_PREFIX}{}.json",
            started_at.with_timezone(&Local).format(FILE_STAMP_FORMAT)
        )
    }

    pub fn to_json(&self) -> Result<String, KeylogError> {
        serde_json::to_string_pretty(self).map_err(|e| KeylogError::Serialize(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, KeylogError> {
        serde_json::from_str(json).map_err(|e| KeylogError::Parse(e.to_string()))
    }

    /// Load a log from disk.
    pub fn load(path: &Path) -> Result<Self, KeylogError> {
        let content = std::fs::read_to_string(path).map_err(|e| KeylogError::Io(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Write the log to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), KeylogError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| KeylogError::Io(e.to_string()))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| KeylogError::Io(e.to_string()))
    }

    /// Sum of the stored per-key counts. Differs from `total_count` only if
    /// the file was edited by hand.
    pub fn counted_total(&self) -> u64 {
        self.keylog.total()
    }
}

/// Write a finished session into `dir` and return the file path.
pub fn save_session(session: &FinishedSession, dir: &Path) -> Result<PathBuf, KeylogError> {
    let path = dir.join(SessionLog::file_name(session.summary.started_at));
    SessionLog::from_session(session).save(&path)?;
    tracing::info!(path = %path.display(), "session log written");
    Ok(path)
}

/// Session log files in `dir`, sorted by name. A missing directory yields
/// an empty list.
pub fn list_logs(dir: &Path) -> Result<Vec<PathBuf>, KeylogError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(KeylogError::Io(e.to_string())),
    };

    let mut logs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let is_json = p.extension().map(|e| e == "json").unwrap_or(false);
            let is_record = p
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(FILE_PREFIX))
                .unwrap_or(false);
            is_json && is_record
        })
        .collect();
    logs.sort();
    Ok(logs)
}

/// Session log errors.
#[derive(Debug)]
pub enum KeylogError {
    Io(String),
    Serialize(String),
    Parse(String),
}

impl std::fmt::Display for KeylogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeylogError::Io(e) => write!(f, "IO error: {e}"),
            KeylogError::Serialize(e) => write!(f, "Serialize error: {e}"),
            KeylogError::Parse(e) => write!(f, "Parse error: {e}"),
        }
    }
}

impl std::error::Error for KeylogError {}
