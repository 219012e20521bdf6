//! Audit log models.
//!
//! One `SearchLog` is appended for every lookup attempt. Entries are never
//! mutated and only the most recent [`MAX_LOGS`] are retained.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Retention cap of the log store.
pub const MAX_LOGS: usize = 500;

/// Outcome of a lookup attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Error,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Error => "error",
        }
    }
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(LogStatus::Success),
            "error" => Ok(LogStatus::Error),
            other => Err(format!("unknown log status: {other}")),
        }
    }
}

/// An audit log entry.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "keyName": "Alpha",
///   "endpoint": "/mobile",
///   "query": "911",
///   "status": "success",
///   "timestamp": "2025-12-21T16:00:00.123Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchLog {
    pub id: String,

    /// Name of the acting key at call time. Not a foreign key: it survives
    /// deletion or rename of the key.
    pub key_name: String,

    pub endpoint: String,
    pub query: String,
    pub status: LogStatus,
    pub timestamp: DateTime<Utc>,
}

impl SearchLog {
    /// Build a new entry stamped with a fresh id and the current time.
    pub fn new(entry: NewSearchLog) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            key_name: entry.key_name,
            endpoint: entry.endpoint,
            query: entry.query,
            status: entry.status,
            timestamp: Utc::now(),
        }
    }
}

/// Request body for `POST /api/logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSearchLog {
    pub key_name: String,
    pub endpoint: String,
    pub query: String,
    pub status: LogStatus,
}

/// Row shape of the `logs` table; `status` is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub struct SearchLogRow {
    pub id: String,
    pub key_name: String,
    pub endpoint: String,
    pub query: String,
    pub status: String,
    pub logged_at: DateTime<Utc>,
}

impl TryFrom<SearchLogRow> for SearchLog {
    type Error = String;

    fn try_from(row: SearchLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            key_name: row.key_name,
            endpoint: row.endpoint,
            query: row.query,
            status: row.status.parse()?,
            timestamp: row.logged_at,
        })
    }
}
