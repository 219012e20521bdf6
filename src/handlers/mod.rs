//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Calls into a service or store
//! 3. Returns HTTP response (JSON, status code)

/// Access key and admin login endpoints
pub mod auth;
/// Liveness and store connectivity
pub mod health;
/// Access key management endpoints
pub mod keys;
/// Audit log endpoints
pub mod logs;
/// Bearer-gated lookup proxy
pub mod lookup;
