//! Audit log append and listing.

use crate::{
    error::AppError,
    models::search_log::{NewSearchLog, SearchLog},
    store::LogStore,
};

/// Stamp and store a new audit entry.
pub async fn append_log(store: &dyn LogStore, entry: NewSearchLog) -> Result<SearchLog, AppError> {
    let log = SearchLog::new(entry);
    store.append_log(&log).await?;

    tracing::debug!(
        log_id = %log.id,
        key_name = %log.key_name,
        endpoint = %log.endpoint,
        status = %log.status,
        "Audit entry recorded"
    );
    Ok(log)
}

/// Most recent entries, newest-first.
pub async fn list_logs(store: &dyn LogStore) -> Result<Vec<SearchLog>, AppError> {
    store.list_logs().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::search_log::LogStatus, store::MemoryStore};

    #[tokio::test]
    async fn appended_entry_is_listed_first() -> anyhow::Result<()> {
        let store = MemoryStore::new();

        append_log(
            &store,
            NewSearchLog {
                key_name: "Beta".into(),
                endpoint: "/vehicle".into(),
                query: "AB12".into(),
                status: LogStatus::Error,
            },
        )
        .await?;
        let log = append_log(
            &store,
            NewSearchLog {
                key_name: "Alpha".into(),
                endpoint: "/mobile".into(),
                query: "911".into(),
                status: LogStatus::Success,
            },
        )
        .await?;

        let logs = list_logs(&store).await?;
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0], log);
        assert_eq!(logs[1].key_name, "Beta");
        Ok(())
    }
}
