use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::services::delivery::{
    AllocationResponse, CreateAllocationRequest, CreatePlacementRequest, PlacementResponse,
    RecordDeliveryRequest, UpdatePaymentStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState};

/// List a campaign's vendor allocations
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}/allocations",
    tag = "Delivery",
    summary = "List allocations",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Allocations retrieved successfully", body = ApiResponse<Vec<AllocationResponse>>),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_allocations(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> ApiResult<Vec<AllocationResponse>> {
    let allocations = state.services.delivery.list_allocations(campaign_id).await?;
    Ok(Json(ApiResponse::success(allocations)))
}

/// Allocate units of a campaign's goal to a vendor
#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/allocations",
    tag = "Delivery",
    summary = "Create allocation",
    description = "Books a block of the campaign goal with a vendor",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = CreateAllocationRequest,
    responses(
        (status = 201, description = "Allocation created successfully", body = ApiResponse<AllocationResponse>),
        (status = 400, description = "Invalid request, cancelled campaign, or inactive vendor", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign or vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_allocation(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<CreateAllocationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AllocationResponse>>), crate::errors::ServiceError> {
    let allocation = state
        .services
        .delivery
        .create_allocation(campaign_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(allocation))))
}

/// Remove an allocation from a draft campaign
#[utoipa::path(
    delete,
    path = "/api/v1/allocations/{id}",
    tag = "Delivery",
    summary = "Delete allocation",
    description = "Removes a mis-entered booking; only allowed while the campaign is in draft",
    params(("id" = Uuid, Path, description = "Allocation ID")),
    responses(
        (status = 200, description = "Allocation deleted successfully", body = ApiResponse<Value>),
        (status = 400, description = "Campaign has left draft", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Allocation not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn delete_allocation(
    State(state): State<AppState>,
    Path(allocation_id): Path<Uuid>,
) -> ApiResult<Value> {
    state.services.delivery.delete_allocation(allocation_id).await?;

    Ok(Json(ApiResponse::success(json!({
        "id": allocation_id,
        "deleted": true,
    }))))
}

/// List a campaign's playlist placements
#[utoipa::path(
    get,
    path = "/api/v1/campaigns/{id}/placements",
    tag = "Delivery",
    summary = "List placements",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    responses(
        (status = 200, description = "Placements retrieved successfully", body = ApiResponse<Vec<PlacementResponse>>),
        (status = 404, description = "Campaign not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_placements(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> ApiResult<Vec<PlacementResponse>> {
    let placements = state.services.delivery.list_placements(campaign_id).await?;
    Ok(Json(ApiResponse::success(placements)))
}

/// Record a playlist placement for a campaign
#[utoipa::path(
    post,
    path = "/api/v1/campaigns/{id}/placements",
    tag = "Delivery",
    summary = "Create placement",
    description = "Records that a track landed on a vendor's playlist",
    params(("id" = Uuid, Path, description = "Campaign ID")),
    request_body = CreatePlacementRequest,
    responses(
        (status = 201, description = "Placement created successfully", body = ApiResponse<PlacementResponse>),
        (status = 400, description = "Invalid request, cancelled campaign, or inactive vendor", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Campaign or vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_placement(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
    Json(request): Json<CreatePlacementRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlacementResponse>>), crate::errors::ServiceError> {
    let placement = state
        .services
        .delivery
        .create_placement(campaign_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(placement))))
}

/// Remove a placement from a draft campaign
#[utoipa::path(
    delete,
    path = "/api/v1/placements/{id}",
    tag = "Delivery",
    summary = "Delete placement",
    description = "Removes a mis-entered placement; only allowed while the campaign is in draft",
    params(("id" = Uuid, Path, description = "Placement ID")),
    responses(
        (status = 200, description = "Placement deleted successfully", body = ApiResponse<Value>),
        (status = 400, description = "Campaign has left draft", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Placement not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn delete_placement(
    State(state): State<AppState>,
    Path(placement_id): Path<Uuid>,
) -> ApiResult<Value> {
    state.services.delivery.delete_placement(placement_id).await?;

    Ok(Json(ApiResponse::success(json!({
        "id": placement_id,
        "deleted": true,
    }))))
}

/// Record delivered units against an allocation
#[utoipa::path(
    post,
    path = "/api/v1/allocations/{id}/delivery",
    tag = "Delivery",
    summary = "Record allocation delivery",
    description = "Reports the cumulative delivered total for an allocation; totals never decrease",
    params(("id" = Uuid, Path, description = "Allocation ID")),
    request_body = RecordDeliveryRequest,
    responses(
        (status = 200, description = "Delivery recorded successfully", body = ApiResponse<AllocationResponse>),
        (status = 400, description = "Delivered total decreased or campaign is cancelled", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Allocation not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn record_allocation_delivery(
    State(state): State<AppState>,
    Path(allocation_id): Path<Uuid>,
    Json(request): Json<RecordDeliveryRequest>,
) -> ApiResult<AllocationResponse> {
    let allocation = state
        .services
        .delivery
        .record_allocation_delivery(allocation_id, request)
        .await?;

    Ok(Json(ApiResponse::success(allocation)))
}

/// Update an allocation's payment status
#[utoipa::path(
    put,
    path = "/api/v1/allocations/{id}/payment",
    tag = "Delivery",
    summary = "Update allocation payment",
    params(("id" = Uuid, Path, description = "Allocation ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated successfully", body = ApiResponse<AllocationResponse>),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Allocation not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_allocation_payment(
    State(state): State<AppState>,
    Path(allocation_id): Path<Uuid>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<AllocationResponse> {
    let allocation = state
        .services
        .delivery
        .update_allocation_payment(allocation_id, request)
        .await?;

    Ok(Json(ApiResponse::success(allocation)))
}

/// Record streams delivered by a placement
#[utoipa::path(
    post,
    path = "/api/v1/placements/{id}/delivery",
    tag = "Delivery",
    summary = "Record placement delivery",
    description = "Reports the cumulative streams a placement has driven; totals never decrease",
    params(("id" = Uuid, Path, description = "Placement ID")),
    request_body = RecordDeliveryRequest,
    responses(
        (status = 200, description = "Delivery recorded successfully", body = ApiResponse<PlacementResponse>),
        (status = 400, description = "Delivered total decreased or campaign is cancelled", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Placement not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn record_placement_delivery(
    State(state): State<AppState>,
    Path(placement_id): Path<Uuid>,
    Json(request): Json<RecordDeliveryRequest>,
) -> ApiResult<PlacementResponse> {
    let placement = state
        .services
        .delivery
        .record_placement_delivery(placement_id, request)
        .await?;

    Ok(Json(ApiResponse::success(placement)))
}

/// Update a placement's payment status
#[utoipa::path(
    put,
    path = "/api/v1/placements/{id}/payment",
    tag = "Delivery",
    summary = "Update placement payment",
    params(("id" = Uuid, Path, description = "Placement ID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated successfully", body = ApiResponse<PlacementResponse>),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Placement not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_placement_payment(
    State(state): State<AppState>,
    Path(placement_id): Path<Uuid>,
    Json(request): Json<UpdatePaymentStatusRequest>,
) -> ApiResult<PlacementResponse> {
    let placement = state
        .services
        .delivery
        .update_placement_payment(placement_id, request)
        .await?;

    Ok(Json(ApiResponse::success(placement)))
}
