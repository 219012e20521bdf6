//! Data models representing stored entities and API payloads.

/// Access key model
pub mod access_key;
/// Login payloads
pub mod auth;
/// Lookup endpoint and proxy response types
pub mod lookup;
/// Audit log model
pub mod search_log;
