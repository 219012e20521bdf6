//! Login request/response bodies.
//!
//! A failed login is a normal `{"success": false}` response, not an error.

use serde::{Deserialize, Serialize};

use crate::models::access_key::AccessKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<AccessKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Plain `{"success": bool}` body shared by several endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
