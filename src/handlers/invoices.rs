use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::services::invoices::{
    CreateInvoiceRequest, InvoiceFilters, InvoiceResponse, UpdateInvoiceStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

/// List invoices
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    tag = "Invoices",
    summary = "List invoices",
    description = "Get a paginated list of invoices with optional filtering",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
        ("status" = Option<String>, Query, description = "Filter by invoice status"),
        ("client_id" = Option<Uuid>, Query, description = "Filter by client"),
        ("overdue_only" = Option<bool>, Query, description = "Only pending invoices past their due date"),
    ),
    responses(
        (status = 200, description = "Invoices retrieved successfully", body = ApiResponse<PaginatedResponse<InvoiceResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    Query(filters): Query<InvoiceFilters>,
) -> ApiResult<PaginatedResponse<InvoiceResponse>> {
    let (page, limit) = query.normalize(state.config.api_max_page_size as u64);
    let result = state
        .services
        .invoices
        .list_invoices(filters, page, limit)
        .await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.invoices,
        result.total,
        result.page,
        result.per_page,
    ))))
}

/// Create an invoice
#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    tag = "Invoices",
    summary = "Create invoice",
    description = "Bill a client; the invoice number is generated when omitted",
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created successfully", body = ApiResponse<InvoiceResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client or campaign not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invoice number already exists", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InvoiceResponse>>), crate::errors::ServiceError> {
    let invoice = state.services.invoices.create_invoice(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invoice))))
}

/// Get an invoice by ID
#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    tag = "Invoices",
    summary = "Get invoice",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice retrieved successfully", body = ApiResponse<InvoiceResponse>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> ApiResult<InvoiceResponse> {
    let invoice = state
        .services
        .invoices
        .get_invoice(invoice_id)
        .await?
        .ok_or_else(|| {
            crate::errors::ServiceError::NotFound(format!("Invoice {} not found", invoice_id))
        })?;

    Ok(Json(ApiResponse::success(invoice)))
}

/// Change an invoice's status
#[utoipa::path(
    put,
    path = "/api/v1/invoices/{id}/status",
    tag = "Invoices",
    summary = "Update invoice status",
    description = "Marks a pending invoice paid or void; paid and void invoices are final",
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceStatusRequest,
    responses(
        (status = 200, description = "Invoice status updated successfully", body = ApiResponse<InvoiceResponse>),
        (status = 400, description = "Transition not allowed from the current status", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_invoice_status(
    State(state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
    Json(request): Json<UpdateInvoiceStatusRequest>,
) -> ApiResult<InvoiceResponse> {
    let invoice = state
        .services
        .invoices
        .update_invoice_status(invoice_id, request)
        .await?;

    Ok(Json(ApiResponse::success(invoice)))
}
