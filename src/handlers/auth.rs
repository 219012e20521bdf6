//! Login handlers.
//!
//! - POST /api/auth/login - Check an access key
//! - POST /api/auth/admin - Check the admin secret
//!
//! Neither endpoint issues a session or token: a successful answer is all the
//! caller gets, and it is up to the caller to remember it.

use axum::{Json, extract::State};

use crate::{
    error::AppError,
    models::auth::{AdminLoginRequest, LoginRequest, LoginResponse, SuccessResponse},
    state::AppState,
};

/// Log in with an access key.
///
/// # Response
///
/// - `{"success": true, "key": {...}}` when the key exists and is enabled
/// - `{"success": false}` otherwise (still 200 OK)
/// - **Error (500)**: store unavailable
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let key = state.gateway.authenticate_key(&request.key).await?;

    Ok(Json(LoginResponse {
        success: key.is_some(),
        key,
    }))
}

/// Log in as admin.
///
/// # Response
///
/// `{"success": bool}`, always 200 OK.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> Json<SuccessResponse> {
    Json(SuccessResponse {
        success: state.gateway.authenticate_admin(&request.password),
    })
}
