//! HTTP router assembly.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, middleware, state::AppState};

/// Build the full router over `state`.
///
/// Key management and log routes are open, as is the admin login; only the
/// lookup proxy requires a bearer access key.
pub fn build_router(state: AppState) -> Router {
    // Lookup proxy, gated by access key
    let authenticated_routes = Router::new()
        .route("/api/lookup", post(handlers::lookup::perform_lookup))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Login
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/admin", post(handlers::auth::admin_login))
        // Key management
        .route(
            "/api/keys",
            get(handlers::keys::list_keys).post(handlers::keys::create_key),
        )
        .route("/api/keys/{id}", delete(handlers::keys::delete_key))
        .route("/api/keys/{id}/toggle", patch(handlers::keys::toggle_key))
        .route(
            "/api/keys/{id}/increment",
            patch(handlers::keys::increment_key),
        )
        // Audit log
        .route(
            "/api/logs",
            get(handlers::logs::list_logs).post(handlers::logs::create_log),
        )
        .merge(authenticated_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{services::lookup_service::LookupProxy, store::MemoryStore};

    fn app() -> Router {
        let store = Arc::new(MemoryStore::new());
        let lookup = LookupProxy::new(reqwest::Client::new(), "http://127.0.0.1:9/api").unwrap();
        build_router(AppState::new(store.clone(), store, "stk7890", lookup))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn create_login_disable_flow() {
        let app = app();

        let (status, key) =
            send(&app, Method::POST, "/api/keys", Some(json!({"name": "Alpha"}))).await;
        assert_eq!(status, StatusCode::OK);
        let token = key["key"].as_str().unwrap().to_string();
        let id = key["id"].as_str().unwrap().to_string();
        let random = token.strip_prefix("fx_").unwrap();
        assert_eq!(random.len(), 24);
        assert!(random.chars().all(|c| c.is_ascii_alphanumeric()));

        let (_, login) =
            send(&app, Method::POST, "/api/auth/login", Some(json!({"key": token}))).await;
        assert_eq!(login["success"], true);
        assert_eq!(login["key"]["name"], "Alpha");

        let (status, toggled) =
            send(&app, Method::PATCH, &format!("/api/keys/{id}/toggle"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled, json!({"success": true, "enabled": false}));

        let (status, login) =
            send(&app, Method::POST, "/api/auth/login", Some(json!({"key": token}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(login, json!({"success": false}));
    }

    #[tokio::test]
    async fn blank_name_is_bad_request() {
        let app = app();

        let (status, body) =
            send(&app, Method::POST, "/api/keys", Some(json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_request");

        let (_, keys) = send(&app, Method::GET, "/api/keys", None).await;
        assert_eq!(keys, json!([]));
    }

    #[tokio::test]
    async fn duplicate_token_is_conflict() {
        let app = app();
        let body = json!({"name": "A", "key": "same"});

        let (status, _) = send(&app, Method::POST, "/api/keys", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::POST, "/api/keys", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "duplicate_key");
    }

    #[tokio::test]
    async fn toggle_unknown_is_not_found_but_delete_and_increment_succeed() {
        let app = app();

        let (status, _) = send(&app, Method::PATCH, "/api/keys/nope/toggle", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/api/keys/nope", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));

        let (status, body) = send(&app, Method::PATCH, "/api/keys/nope/increment", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    #[tokio::test]
    async fn increment_and_delete_existing_key() {
        let app = app();
        let (_, key) = send(
            &app,
            Method::POST,
            "/api/keys",
            Some(json!({"name": "A", "id": "a1", "createdAt": "01/02/2025"})),
        )
        .await;
        assert_eq!(key["id"], "a1");
        assert_eq!(key["createdAt"], "01/02/2025");

        send(&app, Method::PATCH, "/api/keys/a1/increment", None).await;
        send(&app, Method::PATCH, "/api/keys/a1/increment", None).await;
        let (_, keys) = send(&app, Method::GET, "/api/keys", None).await;
        assert_eq!(keys[0]["uses"], 2);

        send(&app, Method::DELETE, "/api/keys/a1", None).await;
        let (_, keys) = send(&app, Method::GET, "/api/keys", None).await;
        assert_eq!(keys, json!([]));
    }

    #[tokio::test]
    async fn appended_log_is_listed_first() {
        let app = app();

        send(
            &app,
            Method::POST,
            "/api/logs",
            Some(json!({"keyName": "Beta", "endpoint": "/v2", "query": "x", "status": "error"})),
        )
        .await;
        let entry = json!({
            "keyName": "Alpha",
            "endpoint": "/mobile",
            "query": "911",
            "status": "success"
        });
        let (status, created) = send(&app, Method::POST, "/api/logs", Some(entry)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, logs) = send(&app, Method::GET, "/api/logs", None).await;
        let first = &logs[0];
        assert_eq!(first, &created);
        assert_eq!(first["keyName"], "Alpha");
        assert_eq!(first["endpoint"], "/mobile");
        assert_eq!(first["query"], "911");
        assert_eq!(first["status"], "success");
        let ts = first["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn admin_login() {
        let app = app();

        let (_, body) =
            send(&app, Method::POST, "/api/auth/admin", Some(json!({"password": "stk7890"}))).await;
        assert_eq!(body, json!({"success": true}));

        let (_, body) =
            send(&app, Method::POST, "/api/auth/admin", Some(json!({"password": "wrong"}))).await;
        assert_eq!(body, json!({"success": false}));
    }

    #[tokio::test]
    async fn lookup_requires_enabled_bearer_key() {
        let app = app();
        let lookup = json!({"endpoint": "mobile", "query": "911"});

        // No header
        let (status, body) = send(&app, Method::POST, "/api/lookup", Some(lookup.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "invalid_api_key");

        // Unknown key
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/lookup")
            .header("Authorization", "Bearer fx_unknown")
            .header("Content-Type", "application/json")
            .body(Body::from(lookup.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn health_reports_connected() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
