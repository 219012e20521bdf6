//! Lookup endpoint selector and proxy request/response types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::search_log::{LogStatus, SearchLog};

/// One of the three fixed upstream query templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupEndpoint {
    Mobile,
    Vehicle,
    General,
}

impl LookupEndpoint {
    /// Upstream path, also recorded as the log entry's `endpoint`.
    pub fn path(&self) -> &'static str {
        match self {
            LookupEndpoint::Mobile => "/mobile",
            LookupEndpoint::Vehicle => "/vehicle",
            LookupEndpoint::General => "/v2",
        }
    }

    /// Name of the single query-string parameter carrying the caller's value.
    pub fn param(&self) -> &'static str {
        match self {
            LookupEndpoint::Mobile => "number",
            LookupEndpoint::Vehicle => "registration",
            LookupEndpoint::General => "query",
        }
    }
}

impl fmt::Display for LookupEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Request body for `POST /api/lookup`.
///
/// ```json
/// { "endpoint": "mobile", "query": "911" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub endpoint: LookupEndpoint,
    pub query: String,
}

/// Outcome of a proxied lookup.
///
/// `data` holds the upstream body on success, `error` the failure message
/// otherwise. `log` is the audit entry recorded for this attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    pub status: LogStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub log: SearchLog,
}
