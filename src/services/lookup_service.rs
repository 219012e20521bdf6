//! Lookup proxy: forwards an authenticated caller's query upstream.
//!
//! # Process
//!
//! 1. Build the upstream URL from the fixed endpoint template
//! 2. Send a single GET (no retry, no timeout beyond the transport default)
//! 3. Record an audit entry with the outcome
//! 4. On success, count one use against the caller's key
//!
//! The log append and the usage increment are two independent writes. The
//! log is written first, so a failed increment leaves a `success` entry
//! without a matching use rather than the reverse.

use url::Url;

use crate::{
    error::AppError,
    models::{
        access_key::AccessKey,
        lookup::{LookupEndpoint, LookupResponse},
        search_log::{LogStatus, NewSearchLog},
    },
    services::{key_service, log_service},
    store::{KeyStore, LogStore},
};

#[derive(Debug, Clone)]
pub struct LookupProxy {
    http: reqwest::Client,
    base_url: Url,
}

impl LookupProxy {
    /// # Errors
    ///
    /// Fails if `base_url` is not an absolute URL that can carry a path.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
        }
        Ok(Self { http, base_url })
    }

    /// Upstream URL for `endpoint` with `query` as its single parameter.
    pub fn build_url(&self, endpoint: LookupEndpoint, query: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(endpoint.path().trim_start_matches('/'));
        }
        url.query_pairs_mut().append_pair(endpoint.param(), query);
        url
    }

    /// Run one lookup on behalf of `key` and record its outcome.
    ///
    /// Upstream failures are not errors here: they come back as a response
    /// with `status: error`. Only validation and store failures are `Err`.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: the query is empty after trimming (nothing is logged)
    /// - `Database`: the audit entry or usage increment could not be written
    pub async fn perform_lookup(
        &self,
        keys: &dyn KeyStore,
        logs: &dyn LogStore,
        key: &AccessKey,
        endpoint: LookupEndpoint,
        query: &str,
    ) -> Result<LookupResponse, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidRequest("Please enter a value".to_string()));
        }

        let url = self.build_url(endpoint, query);
        let outcome = self.fetch(url).await;

        let status = if outcome.is_ok() {
            LogStatus::Success
        } else {
            LogStatus::Error
        };

        let log = log_service::append_log(
            logs,
            NewSearchLog {
                key_name: key.name.clone(),
                endpoint: endpoint.path().to_string(),
                query: query.to_string(),
                status,
            },
        )
        .await?;

        match outcome {
            Ok(data) => {
                key_service::increment_uses(keys, &key.id).await?;
                tracing::info!(key_id = %key.id, endpoint = %endpoint, "Lookup succeeded");
                Ok(LookupResponse {
                    status,
                    data: Some(data),
                    error: None,
                    log,
                })
            }
            Err(e) => {
                tracing::warn!(key_id = %key.id, endpoint = %endpoint, "Lookup failed: {}", e);
                Ok(LookupResponse {
                    status,
                    data: None,
                    error: Some(e.to_string()),
                    log,
                })
            }
        }
    }

    async fn fetch(&self, url: Url) -> Result<serde_json::Value, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| AppError::Upstream(format!("invalid response body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Json, Router,
        extract::Query,
        http::StatusCode,
        routing::get,
    };
    use serde_json::{Value, json};

    use super::*;
    use crate::{models::access_key::CreateKeyRequest, store::MemoryStore};

    /// Serve a fake upstream on an ephemeral port and return its base URL.
    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route(
                "/api/mobile",
                get(|Query(q): Query<std::collections::HashMap<String, String>>| async move {
                    Json(json!({ "number": q.get("number"), "carrier": "Acme" }))
                }),
            )
            .route(
                "/api/vehicle",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/api/v2", get(|| async { "not json" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    async fn setup() -> (LookupProxy, Arc<MemoryStore>, AccessKey) {
        let base = spawn_upstream().await;
        let proxy = LookupProxy::new(reqwest::Client::new(), &base).unwrap();
        let store = Arc::new(MemoryStore::new());
        let key = key_service::create_key(&*store, CreateKeyRequest::named("Alpha"))
            .await
            .unwrap();
        (proxy, store, key)
    }

    #[test]
    fn builds_templated_urls() {
        let proxy = LookupProxy::new(reqwest::Client::new(), "https://example.com/fn/api").unwrap();

        let url = proxy.build_url(LookupEndpoint::Mobile, "911");
        assert_eq!(url.as_str(), "https://example.com/fn/api/mobile?number=911");

        let url = proxy.build_url(LookupEndpoint::Vehicle, "AB 12");
        assert_eq!(
            url.as_str(),
            "https://example.com/fn/api/vehicle?registration=AB+12"
        );

        let url = proxy.build_url(LookupEndpoint::General, "a&b");
        assert_eq!(url.as_str(), "https://example.com/fn/api/v2?query=a%26b");
    }

    #[test]
    fn trailing_slash_base_is_handled() {
        let proxy = LookupProxy::new(reqwest::Client::new(), "https://example.com/api/").unwrap();
        let url = proxy.build_url(LookupEndpoint::Mobile, "1");
        assert_eq!(url.as_str(), "https://example.com/api/mobile?number=1");
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(LookupProxy::new(reqwest::Client::new(), "not a url").is_err());
        assert!(LookupProxy::new(reqwest::Client::new(), "mailto:a@b.c").is_err());
    }

    #[tokio::test]
    async fn success_logs_and_counts_use() -> anyhow::Result<()> {
        let (proxy, store, key) = setup().await;

        let response = proxy
            .perform_lookup(&*store, &*store, &key, LookupEndpoint::Mobile, "  911 ")
            .await?;

        assert_eq!(response.status, LogStatus::Success);
        assert_eq!(response.data.as_ref().unwrap()["number"], Value::from("911"));
        assert_eq!(response.log.query, "911");
        assert_eq!(response.log.endpoint, "/mobile");
        assert_eq!(response.log.key_name, "Alpha");

        let logs = store.list_logs().await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, LogStatus::Success);
        assert_eq!(store.list_keys().await?[0].uses, 1);
        Ok(())
    }

    #[tokio::test]
    async fn upstream_failures_log_error_without_use() -> anyhow::Result<()> {
        let (proxy, store, key) = setup().await;

        // Non-2xx status
        let response = proxy
            .perform_lookup(&*store, &*store, &key, LookupEndpoint::Vehicle, "AB12")
            .await?;
        assert_eq!(response.status, LogStatus::Error);
        assert!(response.data.is_none());
        assert!(response.error.is_some());

        // Body is not JSON
        let response = proxy
            .perform_lookup(&*store, &*store, &key, LookupEndpoint::General, "anything")
            .await?;
        assert_eq!(response.status, LogStatus::Error);

        let logs = store.list_logs().await?;
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.status == LogStatus::Error));
        assert_eq!(store.list_keys().await?[0].uses, 0);
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_error_outcome() -> anyhow::Result<()> {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let proxy = LookupProxy::new(reqwest::Client::new(), &format!("http://{addr}/api"))?;
        let store = MemoryStore::new();
        let key = key_service::create_key(&store, CreateKeyRequest::named("Alpha")).await?;

        let response = proxy
            .perform_lookup(&store, &store, &key, LookupEndpoint::Mobile, "911")
            .await?;
        assert_eq!(response.status, LogStatus::Error);
        assert_eq!(store.list_keys().await?[0].uses, 0);
        Ok(())
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_logging() -> anyhow::Result<()> {
        let (proxy, store, key) = setup().await;

        let err = proxy
            .perform_lookup(&*store, &*store, &key, LookupEndpoint::Mobile, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert!(store.list_logs().await?.is_empty());
        Ok(())
    }
}
