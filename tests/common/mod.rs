#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use influence_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    middleware_helpers::{api_key_middleware, request_id_middleware},
    services::factory::{ServiceContainer, ServiceFactory},
    AppState,
};

/// Spins up the full application router against a fresh in-memory SQLite
/// database. Each instance is fully isolated.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Test app with no API key configured (open write surface).
    pub async fn new() -> Self {
        Self::build(|_| {}).await
    }

    /// Test app gating mutations behind the given API key.
    #[allow(dead_code)]
    pub async fn with_api_key(key: &str) -> Self {
        let key = key.to_string();
        Self::build(move |cfg| cfg.api_key = Some(key)).await
    }

    pub async fn build(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "127.0.0.1", 18_080, "development");
        // A single connection keeps the in-memory schema alive for the
        // lifetime of the pool.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        // Snapshot caching off by default so dashboard assertions never
        // depend on event-loop timing; cache behavior has its own tests.
        cfg.dashboard_cache_ttl_secs = 0;
        customize(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);

        let factory = ServiceFactory::new(db_arc.clone(), event_sender.clone(), &cfg);
        let event_task = tokio::spawn(events::process_events(event_rx, None, factory.cache()));
        let services = ServiceContainer::new(&factory);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", influence_api::api_v1_routes())
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                api_key_middleware,
            ))
            .layer(axum::middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional API key header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        api_key: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body), None).await
    }

}

/// Read and deserialize a JSON response body.
pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// POST a payload, assert 201, and return the enveloped `data` object.
pub async fn create_and_read(app: &TestApp, uri: &str, body: Value) -> Value {
    let response = app.post(uri, body).await;
    let status = response.status();
    let json = response_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "create at {} failed: {}", uri, json);
    json["data"].clone()
}
