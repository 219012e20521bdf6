//! PostgreSQL-backed key and log stores.

use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::{AppError, map_unique_violation},
    models::{
        access_key::{AccessKey, hash_token},
        search_log::{MAX_LOGS, SearchLog, SearchLogRow},
    },
    store::{KeyStore, LogStore},
};

/// Both stores over one shared connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyStore for PgStore {
    async fn list_keys(&self) -> Result<Vec<AccessKey>, AppError> {
        let keys = sqlx::query_as::<_, AccessKey>(
            r#"
            SELECT id, name, token, created_at, uses, enabled
            FROM keys
            ORDER BY inserted_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    async fn insert_key(&self, key: &AccessKey) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO keys (id, name, token, token_hash, created_at, uses, enabled)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&key.id)
        .bind(&key.name)
        .bind(&key.key)
        .bind(key.token_hash())
        .bind(&key.created_at)
        .bind(key.uses)
        .bind(key.enabled)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn delete_key(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn toggle_key(&self, id: &str) -> Result<Option<bool>, AppError> {
        // Single statement, so concurrent toggles cannot lose an update
        let enabled = sqlx::query_scalar::<_, bool>(
            "UPDATE keys SET enabled = NOT enabled WHERE id = $1 RETURNING enabled",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enabled)
    }

    async fn increment_uses(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE keys SET uses = uses + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<AccessKey>, AppError> {
        let key = sqlx::query_as::<_, AccessKey>(
            r#"
            SELECT id, name, token, created_at, uses, enabled
            FROM keys
            WHERE token_hash = $1
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for PgStore {
    async fn append_log(&self, log: &SearchLog) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO logs (id, key_name, endpoint, query, status, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&log.id)
        .bind(&log.key_name)
        .bind(&log.endpoint)
        .bind(&log.query)
        .bind(log.status.as_str())
        .bind(log.timestamp)
        .execute(&mut *tx)
        .await?;

        // Evict everything older than the newest MAX_LOGS
        sqlx::query(
            r#"
            DELETE FROM logs
            WHERE seq IN (
                SELECT seq FROM logs
                ORDER BY seq DESC
                OFFSET $1
            )
            "#,
        )
        .bind(MAX_LOGS as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn list_logs(&self) -> Result<Vec<SearchLog>, AppError> {
        let rows = sqlx::query_as::<_, SearchLogRow>(
            r#"
            SELECT id, key_name, endpoint, query, status, logged_at
            FROM logs
            ORDER BY seq DESC
            LIMIT $1
            "#,
        )
        .bind(MAX_LOGS as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                SearchLog::try_from(row)
                    .map_err(|e| AppError::Database(sqlx::Error::Decode(e.into())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::models::search_log::{LogStatus, NewSearchLog};

    fn key(id: &str, token: &str) -> AccessKey {
        AccessKey {
            id: id.to_string(),
            name: format!("key-{id}"),
            key: token.to_string(),
            created_at: "01/01/2025".to_string(),
            uses: 0,
            enabled: true,
        }
    }

    #[sqlx::test]
    async fn logs_are_capped_and_newest_first(pool: PgPool) -> anyhow::Result<()> {
        let store = PgStore::new(pool.clone());

        for i in 0..=MAX_LOGS {
            let log = SearchLog::new(NewSearchLog {
                key_name: "Default".to_string(),
                endpoint: "/mobile".to_string(),
                query: format!("q{i}"),
                status: LogStatus::Success,
            });
            store.append_log(&log).await?;
        }

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs")
            .fetch_one(&pool)
            .await?;
        assert_eq!(rows, MAX_LOGS as i64);

        let logs = store.list_logs().await?;
        assert_eq!(logs.len(), MAX_LOGS);
        assert_eq!(logs[0].query, format!("q{MAX_LOGS}"));
        assert_eq!(logs[MAX_LOGS - 1].query, "q1");
        assert!(logs.iter().all(|l| l.query != "q0"));
        Ok(())
    }

    #[sqlx::test]
    async fn toggle_twice_restores_enabled(pool: PgPool) -> anyhow::Result<()> {
        let store = PgStore::new(pool);
        store.insert_key(&key("1", "tok-1")).await?;

        assert_eq!(store.toggle_key("1").await?, Some(false));
        assert_eq!(store.toggle_key("1").await?, Some(true));
        assert_eq!(store.toggle_key("missing").await?, None);
        Ok(())
    }

    #[sqlx::test]
    async fn increment_touches_only_its_key(pool: PgPool) -> anyhow::Result<()> {
        let store = PgStore::new(pool);
        store.insert_key(&key("1", "tok-1")).await?;
        store.insert_key(&key("2", "tok-2")).await?;

        store.increment_uses("1").await?;
        store.increment_uses("1").await?;
        store.increment_uses("missing").await?;

        let uses = |id: &str, keys: &[AccessKey]| keys.iter().find(|k| k.id == id).map(|k| k.uses);
        let keys = store.list_keys().await?;
        assert_eq!(keys.len(), 2);
        assert_eq!(uses("1", &keys), Some(2));
        assert_eq!(uses("2", &keys), Some(0));
        Ok(())
    }

    #[sqlx::test]
    async fn duplicate_token_maps_to_duplicate_key(pool: PgPool) -> anyhow::Result<()> {
        let store = PgStore::new(pool);
        store.insert_key(&key("1", "same")).await?;

        let err = store.insert_key(&key("2", "same")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey));

        let err = store.insert_key(&key("1", "other")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey));
        Ok(())
    }

    #[sqlx::test]
    async fn finds_key_by_token_digest(pool: PgPool) -> anyhow::Result<()> {
        let store = PgStore::new(pool);
        store.insert_key(&key("1", "tok-1")).await?;

        let found = store.find_by_token("tok-1").await?;
        assert_eq!(found.map(|k| k.id), Some("1".to_string()));
        assert!(store.find_by_token("tok-2").await?.is_none());

        store.delete_key("1").await?;
        assert!(store.find_by_token("tok-1").await?.is_none());
        Ok(())
    }
}
