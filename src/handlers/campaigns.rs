use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::services::campaigns::{
    CampaignDetailResponse, CampaignFilters, CampaignResponse, CreateCampaignRequest,
    UpdateCampaignRequest, UpdateCampaignStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

/// List campaigns
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "List campaigns",
    description = "Get a paginated list of campaigns with optional filtering",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("status" = Option<String>, Query, description = "Filter by campaign status"),
        ("platform" = Option<String>, Query, description = "Filter by platform"),
        ("client_id" = Option<Uuid>, Query, description = "Filter by client"),
        ("campaign_group_id" = Option<Uuid>, Query, description = "Filter by campaign group"),
    ),
    responses(
        (status = 200, description = "Campaigns retrieved successfully", body = ApiResponse<PaginatedResponse<CampaignResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<CampaignFilters>,
) -> ApiResult<PaginatedResponse<CampaignResponse>> {
    let (page, limit) = query.normalize(state.config.api_max_page_size as u64);
    let result = state
        .services
        .campaigns
        .list_campaigns(filters, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.campaigns,
        result.total,
        result.page,
        result.per_page,
    ))))
}

/// Create a campaign
#[utoipa::path(
    post,
    path = "/api/v1/campaigns",
    tag = "Campaigns",
    summary = "Create campaign",
    description = "Create a promotion campaign in draft status",
    request_body = CreateCampaignRequest,
    responses(
        (status = 201, description = "Campaign created successfully", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client or campaign group not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(request): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignResponse>>), crate::errors::ServiceError> {
    let campaign = state.services.campaigns.create_campaign(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(campaign))))
}

/// Get a campaign with its allocations and placements
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}",
    tag = "Campaigns",
    summary = "Get campaign detail",
    description = "Campaign fields plus its vendor allocations and playlist placements",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign retrieved successfully", body = ApiResponse<CampaignDetailResponse>),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> ApiResult<CampaignDetailResponse> {
    let detail = state
        .services
        .campaigns
        .get_campaign_detail(campaign_id)
        .await?
        .ok_or_else(|| {
            crate::errors::ServiceError::NotFound(format!("Campaign {} not found", campaign_id))
        })?;

    Ok(Json(ApiResponse::success(detail)))
}

/// Update a campaign
#[utoipa::path(
    put,
    path = "/api/v1/campaigns/{id}",
    tag = "Campaigns",
    summary = "Update campaign",
    description = "Edit campaign fields; completed and cancelled campaigns are read-only",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = UpdateCampaignRequest,
    responses(
        (status = 200, description = "Campaign updated successfully", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Invalid request or campaign no longer editable", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<UpdateCampaignRequest>,
) -> ApiResult<CampaignResponse> {
    let campaign = state
        .services
        .campaigns
        .update_campaign(campaign_id, request)
        .await?;

    Ok(Json(ApiResponse::success(campaign)))
}

/// Change a campaign's status
#[utoipa::path(
    put,
    path = "/api/v1/campaigns/{id}/status",
    tag = "Campaigns",
    summary = "Update campaign status",
    description = "Moves a campaign through its lifecycle; invalid transitions are rejected",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = UpdateCampaignStatusRequest,
    responses(
        (status = 200, description = "Campaign status updated successfully", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_campaign_status(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<UpdateCampaignStatusRequest>,
) -> ApiResult<CampaignResponse> {
    let campaign = state
        .services
        .campaigns
        .update_campaign_status(campaign_id, request)
        .await?;

    Ok(Json(ApiResponse::success(campaign)))
}

/// Cancel a campaign
#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/cancel",
    tag = "Campaigns",
    summary = "Cancel campaign",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Campaign cancelled successfully", body = ApiResponse<CampaignResponse>),
        (status = 400, description = "Campaign cannot be cancelled from its current status", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn cancel_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> ApiResult<CampaignResponse> {
    let campaign = state.services.campaigns.cancel_campaign(campaign_id).await?;
    Ok(Json(ApiResponse::success(campaign)))
}
