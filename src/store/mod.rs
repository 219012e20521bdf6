//! Key and log persistence.
//!
//! Handlers and services never touch a concrete database: they receive the
//! stores through [`crate::state::AppState`]. `PgStore` is the production
//! backend; `MemoryStore` backs tests and the client-side mirror.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{access_key::AccessKey, search_log::SearchLog},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistent collection of access keys.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All keys, in insertion order.
    async fn list_keys(&self) -> Result<Vec<AccessKey>, AppError>;

    /// Insert a fully built key. Fails with `DuplicateKey` if the id or the
    /// token is already taken.
    async fn insert_key(&self, key: &AccessKey) -> Result<(), AppError>;

    /// Remove a key. Absent ids are not an error.
    async fn delete_key(&self, id: &str) -> Result<(), AppError>;

    /// Flip `enabled` and return the new value, or `None` if the id is absent.
    async fn toggle_key(&self, id: &str) -> Result<Option<bool>, AppError>;

    /// `uses += 1`. Absent ids are a no-op.
    async fn increment_uses(&self, id: &str) -> Result<(), AppError>;

    /// Find the key carrying `token`, enabled or not.
    async fn find_by_token(&self, token: &str) -> Result<Option<AccessKey>, AppError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Persistent, capped collection of audit entries.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Store a new entry and evict anything beyond the most recent
    /// [`crate::models::search_log::MAX_LOGS`].
    async fn append_log(&self, log: &SearchLog) -> Result<(), AppError>;

    /// Entries newest-first, at most `MAX_LOGS`.
    async fn list_logs(&self) -> Result<Vec<SearchLog>, AppError>;
}
