//! In-process key and log stores.
//!
//! Used by tests and as the local copy held by the client mirror.

use std::collections::VecDeque;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        access_key::AccessKey,
        search_log::{MAX_LOGS, SearchLog},
    },
    store::{KeyStore, LogStore},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: RwLock<Vec<AccessKey>>,
    logs: RwLock<VecDeque<SearchLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every key, e.g. with a fresh copy pulled from the server.
    pub async fn replace_keys(&self, keys: Vec<AccessKey>) {
        *self.keys.write().await = keys;
    }

    /// Replace every log entry. Input is expected newest-first.
    pub async fn replace_logs(&self, logs: Vec<SearchLog>) {
        let mut logs: VecDeque<SearchLog> = logs.into();
        logs.truncate(MAX_LOGS);
        *self.logs.write().await = logs;
    }

    /// Overwrite the key with the same id, or insert it if unknown.
    pub async fn upsert_key(&self, key: AccessKey) {
        let mut keys = self.keys.write().await;
        match keys.iter_mut().find(|k| k.id == key.id) {
            Some(existing) => *existing = key,
            None => keys.push(key),
        }
    }

    /// Set `enabled` directly, returning false if the id is absent.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> bool {
        let mut keys = self.keys.write().await;
        match keys.iter_mut().find(|k| k.id == id) {
            Some(key) => {
                key.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Drop the key with this id, if present.
    pub async fn remove_key(&self, id: &str) {
        self.keys.write().await.retain(|k| k.id != id);
    }

    /// Add one to `uses`, returning false if the id is absent.
    pub async fn bump_uses(&self, id: &str) -> bool {
        match self.keys.write().await.iter_mut().find(|k| k.id == id) {
            Some(key) => {
                key.uses += 1;
                true
            }
            None => false,
        }
    }

    /// Put `log` in front, evicting the oldest entries past the cap.
    pub async fn push_log(&self, log: SearchLog) {
        let mut logs = self.logs.write().await;
        logs.push_front(log);
        logs.truncate(MAX_LOGS);
    }

    pub async fn key_snapshot(&self) -> Vec<AccessKey> {
        self.keys.read().await.clone()
    }

    pub async fn log_snapshot(&self) -> Vec<SearchLog> {
        self.logs.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn list_keys(&self) -> Result<Vec<AccessKey>, AppError> {
        Ok(self.key_snapshot().await)
    }

    async fn insert_key(&self, key: &AccessKey) -> Result<(), AppError> {
        let mut keys = self.keys.write().await;
        if keys.iter().any(|k| k.id == key.id || k.key == key.key) {
            return Err(AppError::DuplicateKey);
        }
        keys.push(key.clone());
        Ok(())
    }

    async fn delete_key(&self, id: &str) -> Result<(), AppError> {
        self.remove_key(id).await;
        Ok(())
    }

    async fn toggle_key(&self, id: &str) -> Result<Option<bool>, AppError> {
        let mut keys = self.keys.write().await;
        Ok(keys.iter_mut().find(|k| k.id == id).map(|key| {
            key.enabled = !key.enabled;
            key.enabled
        }))
    }

    async fn increment_uses(&self, id: &str) -> Result<(), AppError> {
        self.bump_uses(id).await;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AccessKey>, AppError> {
        let keys = self.keys.read().await;
        Ok(keys
            .iter()
            .find(|k| bool::from(k.key.as_bytes().ct_eq(token.as_bytes())))
            .cloned())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append_log(&self, log: &SearchLog) -> Result<(), AppError> {
        self.push_log(log.clone()).await;
        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<SearchLog>, AppError> {
        Ok(self.log_snapshot().await)
    }
}
