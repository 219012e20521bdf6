//! HTTP middleware components.

/// Access key authentication middleware
pub mod auth;
