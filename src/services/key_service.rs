//! Key lifecycle: create, delete, toggle, usage increment.
//!
//! Validation lives here so that every caller (HTTP handlers, startup seeding)
//! rejects bad input before anything reaches the store.

use uuid::Uuid;

use crate::{
    error::AppError,
    models::access_key::{AccessKey, CreateKeyRequest, generate_token, today},
    store::KeyStore,
};

/// Name of the key seeded into an empty store.
pub const DEFAULT_KEY_NAME: &str = "Default";

/// Token of the key seeded into an empty store.
pub const DEFAULT_KEY_TOKEN: &str = "test7890";

/// Build an [`AccessKey`] from a create request without storing it.
///
/// # Errors
///
/// - `InvalidRequest`: `name` is empty or whitespace
pub fn build_key(request: CreateKeyRequest) -> Result<AccessKey, AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Key name is required".to_string()));
    }

    // An empty supplied token counts as "generate one". Anything else is stored as given.
    let key = request
        .key
        .filter(|k| !k.is_empty())
        .unwrap_or_else(generate_token);

    let id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let created_at = request
        .created_at
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(today);

    Ok(AccessKey {
        id,
        name: name.to_string(),
        key,
        created_at,
        uses: 0,
        enabled: true,
    })
}

/// Create and persist a new key.
///
/// # Errors
///
/// - `InvalidRequest`: `name` is empty or whitespace (nothing is written)
/// - `DuplicateKey`: id or token already taken
/// - `Database`: store failure
pub async fn create_key(
    store: &dyn KeyStore,
    request: CreateKeyRequest,
) -> Result<AccessKey, AppError> {
    let key = build_key(request)?;
    store.insert_key(&key).await?;

    tracing::info!(key_id = %key.id, name = %key.name, "Access key created");
    Ok(key)
}

/// Delete a key. Deleting an absent id succeeds.
pub async fn delete_key(store: &dyn KeyStore, id: &str) -> Result<(), AppError> {
    store.delete_key(id).await?;
    tracing::info!(key_id = %id, "Access key deleted");
    Ok(())
}

/// Flip a key's `enabled` flag and return the new value.
///
/// # Errors
///
/// - `KeyNotFound`: no key with this id
pub async fn toggle_key(store: &dyn KeyStore, id: &str) -> Result<bool, AppError> {
    let enabled = store.toggle_key(id).await?.ok_or(AppError::KeyNotFound)?;
    tracing::info!(key_id = %id, enabled, "Access key toggled");
    Ok(enabled)
}

/// Count one use against a key. Absent ids are ignored.
pub async fn increment_uses(store: &dyn KeyStore, id: &str) -> Result<(), AppError> {
    store.increment_uses(id).await
}

/// Insert the default key if the store holds no keys at all.
///
/// Returns true when a key was seeded.
pub async fn seed_default_key(store: &dyn KeyStore) -> Result<bool, AppError> {
    if !store.list_keys().await?.is_empty() {
        return Ok(false);
    }

    let request = CreateKeyRequest {
        name: DEFAULT_KEY_NAME.to_string(),
        key: Some(DEFAULT_KEY_TOKEN.to_string()),
        id: Some("1".to_string()),
        created_at: None,
    };
    create_key(store, request).await?;
    Ok(true)
}
