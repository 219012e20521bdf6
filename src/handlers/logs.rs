//! Audit log handlers.
//!
//! - GET /api/logs - Most recent entries, newest-first
//! - POST /api/logs - Append an entry

use axum::{Json, extract::State};

use crate::{
    error::AppError,
    models::search_log::{NewSearchLog, SearchLog},
    services::log_service,
    state::AppState,
};

/// List up to 500 entries, newest-first.
pub async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<SearchLog>>, AppError> {
    Ok(Json(log_service::list_logs(state.logs.as_ref()).await?))
}

/// Append an entry.
///
/// # Request Body
///
/// ```json
/// { "keyName": "Alpha", "endpoint": "/mobile", "query": "911", "status": "success" }
/// ```
///
/// # Response (200 OK)
///
/// The stored entry with its assigned `id` and `timestamp`.
pub async fn create_log(
    State(state): State<AppState>,
    Json(request): Json<NewSearchLog>,
) -> Result<Json<SearchLog>, AppError> {
    let log = log_service::append_log(state.logs.as_ref(), request).await?;
    Ok(Json(log))
}
