use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::services::clients::{ClientResponse, CreateClientRequest, UpdateClientRequest};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

/// List clients
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "Clients",
    summary = "List clients",
    description = "Get a paginated list of active clients, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 20, max: 100)"),
    ),
    responses(
        (status = 200, description = "Clients retrieved successfully", body = ApiResponse<PaginatedResponse<ClientResponse>>),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<ClientResponse>> {
    let (page, limit) = query.normalize(state.config.api_max_page_size as u64);
    let result = state.services.clients.list_clients(page, limit).await?;

    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        result.clients,
        result.total,
        result.page,
        result.per_page,
    ))))
}

/// Create a client
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "Clients",
    summary = "Create client",
    description = "Add a new client to the roster",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created successfully", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClientResponse>>), crate::errors::ServiceError> {
    let client = state.services.clients.create_client(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(client))))
}

/// Get a client by ID
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    summary = "Get client",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client retrieved successfully", body = ApiResponse<ClientResponse>),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<ClientResponse> {
    let client = state
        .services
        .clients
        .get_client(client_id)
        .await?
        .ok_or_else(|| {
            crate::errors::ServiceError::NotFound(format!("Client {} not found", client_id))
        })?;

    Ok(Json(ApiResponse::success(client)))
}

/// Update a client
#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    summary = "Update client",
    params(("id" = Uuid, Path, description = "Client ID")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated successfully", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> ApiResult<ClientResponse> {
    let client = state
        .services
        .clients
        .update_client(client_id, request)
        .await?;

    Ok(Json(ApiResponse::success(client)))
}

/// Deactivate a client
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    summary = "Deactivate client",
    description = "Soft-deletes a client; campaign and invoice history stays intact",
    params(("id" = Uuid, Path, description = "Client ID")),
    responses(
        (status = 200, description = "Client deactivated successfully", body = ApiResponse<ClientResponse>),
        (status = 400, description = "Client is already inactive", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    security(("ApiKey" = []))
)]
pub async fn deactivate_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<ClientResponse> {
    let client = state.services.clients.deactivate_client(client_id).await?;
    Ok(Json(ApiResponse::success(client)))
}
