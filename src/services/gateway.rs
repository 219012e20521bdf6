//! Access gateway: checks presented access keys and the admin secret.
//!
//! Both checks compare in constant time. The admin secret is kept only as a
//! SHA-256 digest so its length does not leak through the comparison either.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{error::AppError, models::access_key::AccessKey, store::KeyStore};

#[derive(Clone)]
pub struct AccessGateway {
    keys: Arc<dyn KeyStore>,
    admin_digest: [u8; 32],
}

impl AccessGateway {
    pub fn new(keys: Arc<dyn KeyStore>, admin_secret: &str) -> Self {
        Self {
            keys,
            admin_digest: digest(admin_secret),
        }
    }

    /// Return the key record matching `presented`, if it exists and is enabled.
    ///
    /// Unknown and disabled keys both yield `None`.
    pub async fn authenticate_key(&self, presented: &str) -> Result<Option<AccessKey>, AppError> {
        if presented.is_empty() {
            return Ok(None);
        }

        let found = self
            .keys
            .find_by_token(presented)
            .await?
            .filter(|key| bool::from(key.key.as_bytes().ct_eq(presented.as_bytes())))
            .filter(|key| key.enabled);

        if found.is_none() {
            tracing::debug!("Access key rejected");
        }
        Ok(found)
    }

    /// Whether `presented` equals the configured admin secret.
    pub fn authenticate_admin(&self, presented: &str) -> bool {
        let ok: bool = digest(presented).ct_eq(&self.admin_digest).into();
        if !ok {
            tracing::warn!("Admin login rejected");
        }
        ok
    }
}

fn digest(secret: &str) -> [u8; 32] {
    Sha256::digest(secret.as_bytes()).into()
}
