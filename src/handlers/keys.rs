//! Access key management handlers.
//!
//! - GET /api/keys - List keys
//! - POST /api/keys - Create key
//! - DELETE /api/keys/{id} - Delete key
//! - PATCH /api/keys/{id}/toggle - Enable/disable key
//! - PATCH /api/keys/{id}/increment - Count one use

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppError,
    models::{
        access_key::{AccessKey, CreateKeyRequest, ToggleResponse},
        auth::SuccessResponse,
    },
    services::key_service,
    state::AppState,
};

/// List every key.
///
/// # Response (200 OK)
///
/// ```json
/// [
///   {
///     "id": "1",
///     "name": "Default",
///     "key": "test7890",
///     "createdAt": "20/12/2025",
///     "uses": 4,
///     "enabled": true
///   }
/// ]
/// ```
pub async fn list_keys(State(state): State<AppState>) -> Result<Json<Vec<AccessKey>>, AppError> {
    Ok(Json(state.keys.list_keys().await?))
}

/// Create a new key.
///
/// # Request Body
///
/// ```json
/// { "name": "Alpha", "key": "optional", "id": "optional", "createdAt": "optional" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: the created key, including its token
/// - **Error (400)**: empty name
/// - **Error (409)**: id or token already in use
pub async fn create_key(
    State(state): State<AppState>,
    Json(request): Json<CreateKeyRequest>,
) -> Result<Json<AccessKey>, AppError> {
    let key = key_service::create_key(state.keys.as_ref(), request).await?;
    Ok(Json(key))
}

/// Delete a key. Unknown ids still answer `{"success": true}`.
pub async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    key_service::delete_key(state.keys.as_ref(), &id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// Flip a key's `enabled` flag.
///
/// # Response
///
/// - **Success (200 OK)**: `{"success": true, "enabled": false}`
/// - **Error (404)**: unknown id
pub async fn toggle_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, AppError> {
    let enabled = key_service::toggle_key(state.keys.as_ref(), &id).await?;
    Ok(Json(ToggleResponse {
        success: true,
        enabled,
    }))
}

/// Count one use against a key. Unknown ids are ignored.
pub async fn increment_key(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    key_service::increment_uses(state.keys.as_ref(), &id).await?;
    Ok(Json(SuccessResponse::ok()))
}
