use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::AlertSeverity;
use crate::services::alerts::Alert;
use crate::services::dashboard::{
    CampaignPacingResponse, DataGapsResponse, OpsStatusResponse, PlatformHealthResponse,
};
use crate::{ApiResponse, ApiResult, AppState};

/// Operational status snapshot
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/ops-status",
    tag = "Dashboard",
    summary = "Ops status",
    description = "Campaign counts, active-roster pacing, alert totals, and invoice state in one payload",
    responses(
        (status = 200, description = "Ops status retrieved successfully", body = ApiResponse<OpsStatusResponse>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_ops_status(State(state): State<AppState>) -> ApiResult<OpsStatusResponse> {
    let snapshot = state.services.dashboard.ops_status().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AlertFeedQuery {
    /// Only return alerts of this severity
    pub severity: Option<AlertSeverity>,
    /// Cap the number of alerts returned (applied after sorting)
    pub limit: Option<usize>,
}

/// Current alert feed
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/alerts",
    tag = "Dashboard",
    summary = "List alerts",
    description = "Pacing, overdue-invoice, and stalled-delivery alerts ordered by severity then recency",
    params(
        ("severity" = Option<String>, Query, description = "Filter by severity (critical, warning, info)"),
        ("limit" = Option<usize>, Query, description = "Maximum number of alerts to return"),
    ),
    responses(
        (status = 200, description = "Alerts retrieved successfully", body = ApiResponse<Vec<Alert>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertFeedQuery>,
) -> ApiResult<Vec<Alert>> {
    let mut alerts = state.services.dashboard.alerts().await?;
    if let Some(severity) = query.severity {
        alerts.retain(|alert| alert.severity == severity);
    }
    if let Some(limit) = query.limit {
        alerts.truncate(limit);
    }
    Ok(Json(ApiResponse::success(alerts)))
}

/// Per-platform health rollup
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/platform-health",
    tag = "Dashboard",
    summary = "Platform health",
    description = "Active campaigns, goal and delivered units, and pace breakdown for each platform",
    responses(
        (status = 200, description = "Platform health retrieved successfully", body = ApiResponse<PlatformHealthResponse>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_platform_health(
    State(state): State<AppState>,
) -> ApiResult<PlatformHealthResponse> {
    let health = state.services.dashboard.platform_health().await?;
    Ok(Json(ApiResponse::success(health)))
}

/// Campaigns missing pacing inputs
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/data-gaps",
    tag = "Dashboard",
    summary = "Data gaps",
    description = "Open campaigns that cannot be pace-measured and the fields each is missing",
    responses(
        (status = 200, description = "Data gaps retrieved successfully", body = ApiResponse<DataGapsResponse>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_data_gaps(State(state): State<AppState>) -> ApiResult<DataGapsResponse> {
    let gaps = state.services.dashboard.data_gaps().await?;
    Ok(Json(ApiResponse::success(gaps)))
}

/// Pacing detail for one campaign
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}/pacing",
    tag = "Dashboard",
    summary = "Campaign pacing",
    description = "Expected versus actual delivery for a campaign, with the basis used to compute it",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Pacing retrieved successfully", body = ApiResponse<CampaignPacingResponse>),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_campaign_pacing(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> ApiResult<CampaignPacingResponse> {
    let pacing = state.services.dashboard.campaign_pacing(campaign_id).await?;
    Ok(Json(ApiResponse::success(pacing)))
}
