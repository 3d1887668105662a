//! Artist Influence API Library
//!
//! This crate provides the core functionality for the Artist Influence
//! campaign operations backend: clients, campaigns, vendor allocations,
//! playlist placements, invoicing, delivery pacing, and the ops dashboard.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod middleware_helpers;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;
pub mod webhooks;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::factory::ServiceContainer,
}

// Common query parameters for list endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

impl ListQuery {
    /// Clamps the page to at least 1 and the limit to `1..=max_limit`.
    pub fn normalize(&self, max_limit: u64) -> (u64, u64) {
        (self.page.max(1), self.limit.clamp(1, max_limit.max(1)))
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    /// Wraps a page of items, deriving `total_pages` from the limit.
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        Self {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

// API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    // Client roster
    let clients = Router::new()
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clients/:id",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::deactivate_client),
        );

    // Campaign groups (client-facing packages)
    let campaign_groups = Router::new()
        .route(
            "/campaign-groups",
            get(handlers::campaign_groups::list_campaign_groups)
                .post(handlers::campaign_groups::create_campaign_group),
        )
        .route(
            "/campaign-groups/:id",
            get(handlers::campaign_groups::get_campaign_group)
                .put(handlers::campaign_groups::update_campaign_group)
                .delete(handlers::campaign_groups::delete_campaign_group),
        );

    // Campaigns and their lifecycle
    let campaigns = Router::new()
        .route(
            "/campaigns",
            get(handlers::campaigns::list_campaigns).post(handlers::campaigns::create_campaign),
        )
        .route(
            "/campaigns/:id",
            get(handlers::campaigns::get_campaign).put(handlers::campaigns::update_campaign),
        )
        .route(
            "/campaigns/:id/status",
            put(handlers::campaigns::update_campaign_status),
        )
        .route(
            "/campaigns/:id/cancel",
            post(handlers::campaigns::cancel_campaign),
        )
        .route(
            "/campaigns/:id/pacing",
            get(handlers::dashboard::get_campaign_pacing),
        );

    // Vendor allocations and playlist placements under a campaign, plus the
    // delivery and payment actions on each
    let delivery = Router::new()
        .route(
            "/campaigns/:id/allocations",
            get(handlers::delivery::list_allocations).post(handlers::delivery::create_allocation),
        )
        .route(
            "/campaigns/:id/placements",
            get(handlers::delivery::list_placements).post(handlers::delivery::create_placement),
        )
        .route(
            "/allocations/:id",
            delete(handlers::delivery::delete_allocation),
        )
        .route(
            "/allocations/:id/delivery",
            post(handlers::delivery::record_allocation_delivery),
        )
        .route(
            "/allocations/:id/payment",
            put(handlers::delivery::update_allocation_payment),
        )
        .route(
            "/placements/:id",
            delete(handlers::delivery::delete_placement),
        )
        .route(
            "/placements/:id/delivery",
            post(handlers::delivery::record_placement_delivery),
        )
        .route(
            "/placements/:id/payment",
            put(handlers::delivery::update_placement_payment),
        );

    // Vendor roster and fulfillment history
    let vendors = Router::new()
        .route(
            "/vendors",
            get(handlers::vendors::list_vendors).post(handlers::vendors::create_vendor),
        )
        .route(
            "/vendors/:id",
            get(handlers::vendors::get_vendor)
                .put(handlers::vendors::update_vendor)
                .delete(handlers::vendors::deactivate_vendor),
        )
        .route(
            "/vendors/:id/performance",
            get(handlers::vendors::get_vendor_performance),
        );

    // Invoicing
    let invoices = Router::new()
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/invoices/:id", get(handlers::invoices::get_invoice))
        .route(
            "/invoices/:id/status",
            put(handlers::invoices::update_invoice_status),
        );

    // Dashboard snapshots
    let dashboard = Router::new()
        .route(
            "/dashboard/ops-status",
            get(handlers::dashboard::get_ops_status),
        )
        .route("/dashboard/alerts", get(handlers::dashboard::get_alerts))
        .route(
            "/dashboard/platform-health",
            get(handlers::dashboard::get_platform_health),
        )
        .route(
            "/dashboard/data-gaps",
            get(handlers::dashboard::get_data_gaps),
        );

    Router::new()
        // Status and health endpoints
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(clients)
        .merge(campaign_groups)
        .merge(campaigns)
        .merge(delivery)
        .merge(vendors)
        .merge(invoices)
        .merge(dashboard)
}

async fn api_status(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let version = env!("CARGO_PKG_VERSION");
    let git = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME").unwrap_or("unknown");
    let status_data = json!({
        "status": "ok",
        "version": version,
        "git": git,
        "build_time": build_time,
        "service": "influence-api",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Value>>, errors::ServiceError> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": {
            "database": db_status,
        },
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(health_data)))
}

pub mod prelude {
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::metrics::*;
    pub use crate::openapi::*;
    pub use crate::services::*;
    pub use crate::tracing::*;
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }

    #[tokio::test]
    async fn validation_errors_response_includes_metadata() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("meta-validation"),
            async { ApiResponse::<()>::validation_errors(vec!["missing".into()]) },
        )
        .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-validation"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[test]
    fn list_query_normalize_clamps_page_and_limit() {
        let query = ListQuery { page: 0, limit: 500 };
        assert_eq!(query.normalize(100), (1, 100));

        let query = ListQuery { page: 3, limit: 25 };
        assert_eq!(query.normalize(100), (3, 25));

        let query = ListQuery { page: 1, limit: 0 };
        assert_eq!(query.normalize(100), (1, 1));
    }

    #[test]
    fn paginated_response_derives_total_pages() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(page.total_pages, 3);

        let empty = PaginatedResponse::<i32>::new(vec![], 0, 1, 20);
        assert_eq!(empty.total_pages, 0);
    }
}
