//! Caller-side mirror of keys, logs and the login session.
//!
//! Every operation asks the server first. When the server cannot be reached,
//! or answers with a 5xx because its store is down, the mirror keeps working
//! from its local copy:
//!
//! - refreshes keep the stale copy
//! - key edits are applied to the local copy only
//! - logins are checked against the local copy, but only when the mirror was
//!   built with [`AuthFallback::LocalCache`]
//!
//! A local login trusts whatever the mirror last saw: a key revoked on the
//! server since the last refresh still logs in, and the admin check uses a
//! secret held by the client. Both are logged at `warn` and recorded on the
//! session as [`AuthSource::LocalCache`].

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{
    client::api::{ClientError, PortalApi},
    models::{
        access_key::{AccessKey, CreateKeyRequest},
        lookup::{LookupEndpoint, LookupResponse},
        search_log::{LogStatus, NewSearchLog, SearchLog},
    },
    services::key_service,
    store::{KeyStore, MemoryStore},
};

/// How logins behave when the server is unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFallback {
    /// Unreachable server means failed login.
    Disabled,
    /// Check the mirrored key list, and this admin secret, instead.
    LocalCache { admin_secret: String },
}

/// Who vouched for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Remote,
    LocalCache,
}

/// Login flags. Key and admin logins are independent of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub current_key: Option<AccessKey>,
    pub is_admin: bool,
    pub key_source: Option<AuthSource>,
    pub admin_source: Option<AuthSource>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.current_key.is_some()
    }
}

pub struct ClientMirror {
    api: Arc<dyn PortalApi>,
    local: MemoryStore,
    session: Session,
    fallback: AuthFallback,
}

impl ClientMirror {
    pub fn new(api: Arc<dyn PortalApi>, fallback: AuthFallback) -> Self {
        Self {
            api,
            local: MemoryStore::new(),
            session: Session::default(),
            fallback,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn keys(&self) -> Vec<AccessKey> {
        self.local.key_snapshot().await
    }

    pub async fn logs(&self) -> Vec<SearchLog> {
        self.local.log_snapshot().await
    }

    /// Pull the key list. On failure the stale copy stays.
    pub async fn refresh_keys(&self) {
        match self.api.list_keys().await {
            Ok(keys) => self.local.replace_keys(keys).await,
            Err(e) => tracing::warn!("Keeping stale keys: {}", e),
        }
    }

    /// Pull the log list. On failure the stale copy stays.
    pub async fn refresh_logs(&self) {
        match self.api.list_logs().await {
            Ok(logs) => self.local.replace_logs(logs).await,
            Err(e) => tracing::warn!("Keeping stale logs: {}", e),
        }
    }

    /// Log in with an access key. Returns whether it succeeded.
    pub async fn login(&mut self, key: &str) -> bool {
        let (found, source) = match self.api.login(key).await {
            Ok(response) => (response.key.filter(|_| response.success), AuthSource::Remote),
            Err(e) if e.is_unreachable() => match self.fallback {
                AuthFallback::Disabled => {
                    tracing::warn!("Login failed, server unreachable: {}", e);
                    return false;
                }
                AuthFallback::LocalCache { .. } => {
                    let found = self.local_key(key).await;
                    if found.is_some() {
                        tracing::warn!("Server unreachable, key accepted from local cache");
                    }
                    (found, AuthSource::LocalCache)
                }
            },
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                return false;
            }
        };

        match found {
            Some(key) => {
                self.session.current_key = Some(key);
                self.session.key_source = Some(source);
                true
            }
            None => false,
        }
    }

    /// Log in as admin. Returns whether it succeeded.
    pub async fn admin_login(&mut self, password: &str) -> bool {
        let (ok, source) = match self.api.admin_login(password).await {
            Ok(ok) => (ok, AuthSource::Remote),
            Err(e) if e.is_unreachable() => match &self.fallback {
                AuthFallback::Disabled => {
                    tracing::warn!("Admin login failed, server unreachable: {}", e);
                    return false;
                }
                AuthFallback::LocalCache { admin_secret } => {
                    let ok = secrets_match(password, admin_secret);
                    if ok {
                        tracing::warn!("Server unreachable, admin accepted from local secret");
                    }
                    (ok, AuthSource::LocalCache)
                }
            },
            Err(e) => {
                tracing::warn!("Admin login failed: {}", e);
                return false;
            }
        };

        if ok {
            self.session.is_admin = true;
            self.session.admin_source = Some(source);
        }
        ok
    }

    /// Back to the logged-out state.
    pub fn logout(&mut self) {
        self.session = Session::default();
    }

    /// Create a key on the server and mirror it. If the server is
    /// unreachable the key is created in the local copy only.
    pub async fn add_key(&self, request: CreateKeyRequest) -> Result<AccessKey, ClientError> {
        match self.api.create_key(&request).await {
            Ok(key) => {
                self.local.upsert_key(key.clone()).await;
                Ok(key)
            }
            Err(e) if e.is_unreachable() => {
                tracing::warn!("Server unreachable, creating key locally: {}", e);
                key_service::create_key(&self.local, request)
                    .await
                    .map_err(|e| ClientError::InvalidRequest(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn delete_key(&self, id: &str) -> Result<(), ClientError> {
        match self.api.delete_key(id).await {
            Ok(()) => {}
            Err(e) if e.is_unreachable() => {
                tracing::warn!("Server unreachable, deleting key locally: {}", e);
            }
            Err(e) => return Err(e),
        }
        self.local.remove_key(id).await;
        Ok(())
    }

    /// Flip a key's `enabled` flag and return the new value.
    pub async fn toggle_key(&self, id: &str) -> Result<bool, ClientError> {
        match self.api.toggle_key(id).await {
            Ok(enabled) => {
                self.local.set_enabled(id, enabled).await;
                Ok(enabled)
            }
            Err(e) if e.is_unreachable() => {
                tracing::warn!("Server unreachable, toggling key locally: {}", e);
                self.local
                    .toggle_key(id)
                    .await
                    .ok()
                    .flatten()
                    .ok_or_else(|| ClientError::InvalidRequest(format!("unknown key {id}")))
            }
            Err(e) => Err(e),
        }
    }

    /// Run a lookup as the logged-in key and fold the outcome into the
    /// local copy.
    ///
    /// If the server is unreachable an `error` entry is added locally and
    /// the transport error is returned.
    pub async fn search(
        &mut self,
        endpoint: LookupEndpoint,
        query: &str,
    ) -> Result<LookupResponse, ClientError> {
        let current = self.session.current_key.clone().ok_or(ClientError::NotLoggedIn)?;
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::InvalidRequest("Please enter a value".to_string()));
        }

        match self.api.lookup(&current.key, endpoint, query).await {
            Ok(response) => {
                self.local.push_log(response.log.clone()).await;
                if response.status == LogStatus::Success {
                    self.local.bump_uses(&current.id).await;
                    if let Some(key) = self.session.current_key.as_mut() {
                        key.uses += 1;
                    }
                }
                Ok(response)
            }
            Err(e) => {
                if e.is_unreachable() {
                    let log = SearchLog::new(NewSearchLog {
                        key_name: current.name.clone(),
                        endpoint: endpoint.path().to_string(),
                        query: query.to_string(),
                        status: LogStatus::Error,
                    });
                    self.local.push_log(log).await;
                }
                Err(e)
            }
        }
    }

    async fn local_key(&self, token: &str) -> Option<AccessKey> {
        self.local
            .find_by_token(token)
            .await
            .ok()
            .flatten()
            .filter(|k| k.enabled)
    }
}

fn secrets_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.ct_eq(&b).into()
}
