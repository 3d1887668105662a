use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::campaign_groups::{
    CampaignGroupDetailResponse, CampaignGroupResponse, CreateCampaignGroupRequest,
    UpdateCampaignGroupRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CampaignGroupListParams {
    pub client_id: Option<Uuid>,
}

/// List campaign groups
#[utoipa::path(
    get,
    path = "/api/v1/campaign-groups",
    tag = "Campaign Groups",
    summary = "List campaign groups",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("client_id" = Option<Uuid>, Query, description = "Only groups belonging to this client"),
    ),
    responses(
        (status = 200, description = "Campaign groups retrieved successfully", body = ApiResponse<PaginatedResponse<CampaignGroupResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_campaign_groups(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(params): Query<CampaignGroupListParams>,
) -> ApiResult<PaginatedResponse<CampaignGroupResponse>> {
    let (page, limit) = query.normalize(state.config.api_max_page_size as u64);
    let result = state
        .services
        .campaign_groups
        .list_groups(params.client_id, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.groups,
        result.total,
        result.page,
        result.per_page,
    ))))
}

/// Create a campaign group
#[utoipa::path(
    post,
    path = "/api/v1/campaign-groups",
    tag = "Campaign Groups",
    summary = "Create campaign group",
    description = "Create a named package of campaigns for one client",
    request_body = CreateCampaignGroupRequest,
    responses(
        (status = 201, description = "Campaign group created successfully", body = ApiResponse<CampaignGroupResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_campaign_group(
    State(state): State<AppState>,
    Json(request): Json<CreateCampaignGroupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignGroupResponse>>), crate::errors::ServiceError> {
    let group = state.services.campaign_groups.create_group(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(group))))
}

/// Get a campaign group by ID
#[utoipa::path(
    get,
    path = "/api/v1/campaign-groups/{id}",
    tag = "Campaign Groups",
    summary = "Get campaign group",
    description = "The group plus a pacing rollup for each member campaign",
    params(("id" = Uuid, Path, description = "Campaign group ID")),
    responses(
        (status = 200, description = "Campaign group retrieved successfully", body = ApiResponse<CampaignGroupDetailResponse>),
        (status = 404, description = "Campaign group not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_campaign_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<CampaignGroupDetailResponse> {
    let group = state
        .services
        .campaign_groups
        .get_group(group_id)
        .await?
        .ok_or_else(|| {
            crate::errors::ServiceError::NotFound(format!("Campaign group {} not found", group_id))
        })?;
    let campaigns = state.services.dashboard.group_pacing(group_id).await?;

    Ok(Json(ApiResponse::success(CampaignGroupDetailResponse {
        group,
        campaigns,
    })))
}

/// Update a campaign group
#[utoipa::path(
    put,
    path = "/api/v1/campaign-groups/{id}",
    tag = "Campaign Groups",
    summary = "Update campaign group",
    params(("id" = Uuid, Path, description = "Campaign group ID")),
    request_body = UpdateCampaignGroupRequest,
    responses(
        (status = 200, description = "Campaign group updated successfully", body = ApiResponse<CampaignGroupResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign group not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_campaign_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(request): Json<UpdateCampaignGroupRequest>,
) -> ApiResult<CampaignGroupResponse> {
    let group = state
        .services
        .campaign_groups
        .update_group(group_id, request)
        .await?;

    Ok(Json(ApiResponse::success(group)))
}

/// Delete a campaign group
#[utoipa::path(
    delete,
    path = "/api/v1/campaign-groups/{id}",
    tag = "Campaign Groups",
    summary = "Delete campaign group",
    description = "Removes the group; member campaigns stay and become ungrouped",
    params(("id" = Uuid, Path, description = "Campaign group ID")),
    responses(
        (status = 200, description = "Campaign group deleted successfully", body = ApiResponse<Value>),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign group not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn delete_campaign_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Value> {
    state.services.campaign_groups.delete_group(group_id).await?;

    Ok(Json(ApiResponse::success(json!({
        "id": group_id,
        "deleted": true,
    }))))
}
