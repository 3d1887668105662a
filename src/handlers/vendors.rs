use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::services::vendors::{
    CreateVendorRequest, UpdateVendorRequest, VendorPerformanceResponse, VendorResponse,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

/// List vendors
#[utoipa::path(
    get,
    path = "/api/v1/vendors",
    tag = "Vendors",
    summary = "List vendors",
    description = "Get a paginated list of active vendors, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
    ),
    responses(
        (status = 200, description = "Vendors retrieved successfully", body = ApiResponse<PaginatedResponse<VendorResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<VendorResponse>> {
    let (page, limit) = query.normalize(state.config.api_max_page_size as u64);
    let result = state.services.vendors.list_vendors(page, limit).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.vendors,
        result.total,
        result.page,
        result.per_page,
    ))))
}

/// Create a vendor
#[utoipa::path(
    post,
    path = "/api/v1/vendors",
    tag = "Vendors",
    summary = "Create vendor",
    description = "Add a promotion vendor (playlist curator, channel network, influencer)",
    request_body = CreateVendorRequest,
    responses(
        (status = 201, description = "Vendor created successfully", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    Json(request): Json<CreateVendorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VendorResponse>>), crate::errors::ServiceError> {
    let vendor = state.services.vendors.create_vendor(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vendor))))
}

/// Get a vendor by ID
#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}",
    tag = "Vendors",
    summary = "Get vendor",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor retrieved successfully", body = ApiResponse<VendorResponse>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> ApiResult<VendorResponse> {
    let vendor = state
        .services
        .vendors
        .get_vendor(vendor_id)
        .await?
        .ok_or_else(|| {
            crate::errors::ServiceError::NotFound(format!("Vendor {} not found", vendor_id))
        })?;

    Ok(Json(ApiResponse::success(vendor)))
}

/// Update a vendor
#[utoipa::path(
    put,
    path = "/api/v1/vendors/{id}",
    tag = "Vendors",
    summary = "Update vendor",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = UpdateVendorRequest,
    responses(
        (status = 200, description = "Vendor updated successfully", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
    Json(request): Json<UpdateVendorRequest>,
) -> ApiResult<VendorResponse> {
    let vendor = state
        .services
        .vendors
        .update_vendor(vendor_id, request)
        .await?;

    Ok(Json(ApiResponse::success(vendor)))
}

/// Deactivate a vendor
#[utoipa::path(
    delete,
    path = "/api/v1/vendors/{id}",
    tag = "Vendors",
    summary = "Deactivate vendor",
    description = "Soft-deletes a vendor; existing allocations and placements stay intact",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deactivated successfully", body = ApiResponse<VendorResponse>),
        (status = 400, description = "Vendor is already inactive", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn deactivate_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> ApiResult<VendorResponse> {
    let vendor = state.services.vendors.deactivate_vendor(vendor_id).await?;
    Ok(Json(ApiResponse::success(vendor)))
}

/// Vendor fulfillment history
#[utoipa::path(
    get,
    path = "/api/v1/vendors/{id}/performance",
    tag = "Vendors",
    summary = "Get vendor performance",
    description = "Allocation fulfillment and placement delivery across every campaign the vendor has served",
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor performance retrieved successfully", body = ApiResponse<VendorPerformanceResponse>),
        (status = 404, description = "Vendor not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_vendor_performance(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> ApiResult<VendorPerformanceResponse> {
    let performance = state.services.vendors.vendor_performance(vendor_id).await?;
    Ok(Json(ApiResponse::success(performance)))
}
