//! Lookup proxy handler.

use axum::{Extension, Json, extract::State};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::lookup::{LookupRequest, LookupResponse},
    state::AppState,
};

/// Run a lookup against one of the fixed upstream endpoints.
///
/// # Endpoint
///
/// `POST /api/lookup`
///
/// # Authentication
///
/// Requires `Authorization: Bearer <access key>`; the key must be enabled.
///
/// # Request Body
///
/// ```json
/// { "endpoint": "mobile", "query": "911" }
/// ```
///
/// # Response
///
/// - **200 OK**: `{"status": "success", "data": {...}, "log": {...}}`, or
///   `{"status": "error", "error": "...", "log": {...}}` when the upstream failed
/// - **Error (400)**: blank query
/// - **Error (401)**: missing, unknown or disabled key
pub async fn perform_lookup(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, AppError> {
    let response = state
        .lookup
        .perform_lookup(
            state.keys.as_ref(),
            state.logs.as_ref(),
            &auth.key,
            request.endpoint,
            &request.query,
        )
        .await?;

    Ok(Json(response))
}
