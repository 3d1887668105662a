use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use http::{header, HeaderName, HeaderValue, Method};
use tokio::sync::mpsc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{error, info, warn};

use influence_api::config;
use influence_api::db;
use influence_api::events::{self, EventSender};
use influence_api::middleware_helpers::{api_key_middleware, request_id_middleware, API_KEY_HEADER};
use influence_api::services::factory::{ServiceContainer, ServiceFactory};
use influence_api::webhooks::WebhookNotifier;
use influence_api::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!(
        environment = %cfg.environment,
        "Starting influence-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_pool = db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        info!("Running pending database migrations");
        db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Database migration failed: {}", e);
            e
        })?;
    }
    let db = Arc::new(db_pool);

    // Domain events fan out to the webhook notifier and keep dashboard
    // snapshots fresh; a bounded channel applies backpressure to writers.
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = EventSender::new(event_tx);

    let notifier = WebhookNotifier::from_config(&cfg);
    match &notifier {
        Some(_) => info!("Outbound webhook notifications enabled"),
        None => info!("Webhook URL not configured; outbound notifications disabled"),
    }

    let factory = ServiceFactory::new(db.clone(), event_sender.clone(), &cfg);
    // The event loop must invalidate the same cache the dashboard reads from.
    tokio::spawn(events::process_events(event_rx, notifier, factory.cache()));
    let services = ServiceContainer::new(&factory);

    let app_state = AppState {
        db: db.clone(),
        config: cfg.clone(),
        event_sender,
        services,
    };

    let configured_origins: Vec<HeaderValue> = cfg
        .cors_allowed_origins
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter_map(|origin| {
            let origin = origin.trim();
            if origin.is_empty() {
                return None;
            }
            origin
                .parse::<HeaderValue>()
                .map_err(|e| warn!(%origin, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    let cors_layer = if !configured_origins.is_empty() {
        let base = CorsLayer::new().allow_origin(configured_origins);
        if cfg.cors_allow_credentials {
            // tower-http rejects credentials combined with wildcard
            // methods or headers, so enumerate what the API accepts.
            base.allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    header::CONTENT_TYPE,
                    HeaderName::from_static(API_KEY_HEADER),
                ])
        } else {
            base.allow_methods(Any).allow_headers(Any)
        }
    } else if cfg.should_allow_permissive_cors() {
        warn!("CORS allowed origins not configured; allowing all origins");
        CorsLayer::permissive()
    } else {
        // load_config validation rejects this combination already.
        return Err(format!(
            "cors_allowed_origins must be configured when environment is '{}'",
            cfg.environment
        )
        .into());
    };

    if cfg.api_key.is_none() {
        warn!("API key not configured; write endpoints are unauthenticated");
    }

    let mut app = Router::new()
        .route("/", get(|| async { "influence-api is running" }))
        .route(
            "/metrics",
            get(|| async {
                match influence_api::metrics::metrics_handler().await {
                    Ok(body) => (StatusCode::OK, body),
                    Err(e) => {
                        error!("Failed to export metrics: {}", e);
                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    }
                }
            }),
        )
        .route(
            "/metrics/json",
            get(|| async {
                match influence_api::metrics::metrics_json_handler().await {
                    Ok(body) => (StatusCode::OK, axum::Json(body)),
                    Err(e) => {
                        error!("Failed to export metrics: {}", e);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            axum::Json(serde_json::json!({"error": "metrics export failed"})),
                        )
                    }
                }
            }),
        )
        .nest("/api/v1", influence_api::api_v1_routes());

    if cfg.enable_swagger_ui {
        info!("Swagger UI available at /docs");
        app = app.merge(influence_api::openapi::swagger_ui());
    }

    let app = app
        .layer(influence_api::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(cfg.request_timeout_secs)))
        .layer(cors_layer)
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            api_key_middleware,
        ))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("influence-api listening on http://{}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
