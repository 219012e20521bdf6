//! Access key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the access key from the Authorization header
//! 2. Check it through the access gateway (must exist and be enabled)
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::access_key::AccessKey, state::AppState};

/// Authentication context attached to authenticated requests.
///
/// Route handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The key record as it was when the request was authenticated
    pub key: AccessKey,
}

/// Access key authentication middleware function.
///
/// # Headers
///
/// Expected header format:
/// ```text
/// Authorization: Bearer fx_abc123xyz
/// ```
///
/// # Returns
///
/// - `Ok(Response)` if authenticated successfully (calls next handler)
/// - `Err(AppError::InvalidApiKey)` if the header is missing, malformed,
///   or names an unknown or disabled key
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidApiKey)?;

    let key = state
        .gateway
        .authenticate_key(presented)
        .await?
        .ok_or(AppError::InvalidApiKey)?;

    request.extensions_mut().insert(AuthContext { key });

    Ok(next.run(request).await)
}
