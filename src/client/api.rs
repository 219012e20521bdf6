//! Typed HTTP client for the portal API.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::models::{
    access_key::{AccessKey, CreateKeyRequest, ToggleResponse},
    auth::{LoginResponse, SuccessResponse},
    lookup::{LookupEndpoint, LookupRequest, LookupResponse},
    search_log::SearchLog,
};

/// Client-side failures.
///
/// `Transport` and 5xx `Status` answers count as an unavailable server, and
/// the mirror falls back to its local copy for them. 4xx answers are final.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("server unreachable: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("API error: {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The operation needs a logged-in key.
    #[error("not logged in")]
    NotLoggedIn,

    /// Rejected locally before reaching the server.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// No answer at all, or a server-side failure such as its store being down.
    pub fn is_unreachable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// The remote operations the mirror relies on.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn login(&self, key: &str) -> Result<LoginResponse, ClientError>;
    async fn admin_login(&self, password: &str) -> Result<bool, ClientError>;
    async fn list_keys(&self) -> Result<Vec<AccessKey>, ClientError>;
    async fn create_key(&self, request: &CreateKeyRequest) -> Result<AccessKey, ClientError>;
    async fn delete_key(&self, id: &str) -> Result<(), ClientError>;
    async fn toggle_key(&self, id: &str) -> Result<bool, ClientError>;
    async fn list_logs(&self) -> Result<Vec<SearchLog>, ClientError>;
    async fn lookup(
        &self,
        key: &str,
        endpoint: LookupEndpoint,
        query: &str,
    ) -> Result<LookupResponse, ClientError>;
}

/// [`PortalApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpPortalApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpPortalApi {
    /// `base_url` is the server root, e.g. `http://localhost:3001`.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        Ok(self.http.request(method, url))
    }

    /// Request against `/api/keys/{id}[/{action}]` with `id` percent-encoded.
    fn key_request(
        &self,
        method: Method,
        id: &str,
        action: Option<&str>,
    ) -> Result<RequestBuilder, ClientError> {
        let mut url = self
            .base_url
            .join("/api/keys")
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidRequest("base URL cannot carry a path".into()))?;
            segments.push(id);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(self.http.request(method, url))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn login(&self, key: &str) -> Result<LoginResponse, ClientError> {
        let builder = self
            .request(Method::POST, "/api/auth/login")?
            .json(&json!({ "key": key }));
        self.send(builder).await
    }

    async fn admin_login(&self, password: &str) -> Result<bool, ClientError> {
        let builder = self
            .request(Method::POST, "/api/auth/admin")?
            .json(&json!({ "password": password }));
        let response: SuccessResponse = self.send(builder).await?;
        Ok(response.success)
    }

    async fn list_keys(&self) -> Result<Vec<AccessKey>, ClientError> {
        self.send(self.request(Method::GET, "/api/keys")?).await
    }

    async fn create_key(&self, request: &CreateKeyRequest) -> Result<AccessKey, ClientError> {
        let builder = self.request(Method::POST, "/api/keys")?.json(request);
        self.send(builder).await
    }

    async fn delete_key(&self, id: &str) -> Result<(), ClientError> {
        let builder = self.key_request(Method::DELETE, id, None)?;
        let _: SuccessResponse = self.send(builder).await?;
        Ok(())
    }

    async fn toggle_key(&self, id: &str) -> Result<bool, ClientError> {
        let builder = self.key_request(Method::PATCH, id, Some("toggle"))?;
        let response: ToggleResponse = self.send(builder).await?;
        Ok(response.enabled)
    }

    async fn list_logs(&self) -> Result<Vec<SearchLog>, ClientError> {
        self.send(self.request(Method::GET, "/api/logs")?).await
    }

    async fn lookup(
        &self,
        key: &str,
        endpoint: LookupEndpoint,
        query: &str,
    ) -> Result<LookupResponse, ClientError> {
        let builder = self
            .request(Method::POST, "/api/lookup")?
            .bearer_auth(key)
            .json(&LookupRequest {
                endpoint,
                query: query.to_string(),
            });
        self.send(builder).await
    }
}
