//! Access key model and API request/response types.
//!
//! Access keys gate use of the lookup portal. Each key carries a secret token
//! that callers present as `Authorization: Bearer <token>`.

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix of every generated token.
pub const TOKEN_PREFIX: &str = "fx_";

/// Number of random alphanumeric characters after [`TOKEN_PREFIX`].
pub const TOKEN_RANDOM_LEN: usize = 24;

/// Represents an access key record.
///
/// # Database Table
///
/// Maps to the `keys` table. The secret token lives in the `token` column;
/// `token_hash` (SHA-256, hex) is only used as a lookup index and never
/// leaves the store.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "1",
///   "name": "Default",
///   "key": "test7890",
///   "createdAt": "20/12/2025",
///   "uses": 0,
///   "enabled": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    /// Unique identifier, immutable once assigned
    pub id: String,

    /// Human-readable label
    pub name: String,

    /// The secret token itself
    #[sqlx(rename = "token")]
    pub key: String,

    /// Creation date, `DD/MM/YYYY`
    pub created_at: String,

    /// Number of successful proxied lookups made with this key
    pub uses: i64,

    /// Disabled keys fail authentication
    pub enabled: bool,
}

impl AccessKey {
    /// Hex-encoded SHA-256 digest of the token.
    pub fn token_hash(&self) -> String {
        hash_token(&self.key)
    }
}

/// Request body for creating a new key.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Alpha",
///   "key": "fx_optionalCustomToken"
/// }
/// ```
///
/// # Validation
///
/// - `name`: Required, must not be empty or whitespace
/// - `key`: Optional, generated when missing or empty
/// - `id`, `createdAt`: Optional, assigned when missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl CreateKeyRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Response body for `PATCH /api/keys/{id}/toggle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub enabled: bool,
}

/// Generate a fresh token: `fx_` followed by 24 alphanumeric characters.
///
/// Uniform over the 62-character alphabet. Collisions are possible and are
/// caught by the store's uniqueness check, not here.
pub fn generate_token() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{TOKEN_PREFIX}{random}")
}

/// Today's date in the `DD/MM/YYYY` form used for `createdAt`.
pub fn today() -> String {
    Utc::now().format("%d/%m/%Y").to_string()
}

/// Hex-encoded SHA-256 digest of a token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_token_shape() {
        for _ in 0..50 {
            let token = generate_token();
            let random = token.strip_prefix("fx_").expect("prefix");
            assert_eq!(random.len(), 24);
            assert!(random.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn today_is_day_month_year() {
        let date = today();
        let parts: Vec<&str> = date.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 2);
        assert_eq!(parts[1].len(), 2);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn serializes_camel_case() {
        let key = AccessKey {
            id: "1".into(),
            name: "Default".into(),
            key: "test7890".into(),
            created_at: "01/01/2025".into(),
            uses: 3,
            enabled: true,
        };
        let value = serde_json::to_value(&key).unwrap();
        assert_eq!(value["createdAt"], "01/01/2025");
        assert_eq!(value["key"], "test7890");
        assert_eq!(value["uses"], 3);
    }

    #[test]
    fn token_hash_is_stable_hex() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        assert_eq!(hash_token("abc").len(), 64);
    }
}
