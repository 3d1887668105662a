use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Artist Influence API",
        version = "1.0.0",
        description = r#"
# Artist Influence Campaign Operations API

Backend for running music promotion campaigns across Spotify, YouTube,
Instagram, and SoundCloud: client and vendor rosters, campaign lifecycle,
vendor allocations and playlist placements, delivery pacing, invoicing, and
the ops dashboard.

## Features

- **Clients & Campaign Groups**: Roster management and client-facing packages
- **Campaign Lifecycle**: Draft, active, paused, complete, and cancelled states with guarded transitions
- **Delivery Tracking**: Cumulative, monotonic delivery totals per vendor allocation and playlist placement
- **Pacing**: Expected-vs-actual delivery with on-track / behind / critical classification
- **Alerts**: Pacing, overdue-invoice, and stalled-delivery alerts ordered by severity
- **Invoicing**: INV-YYYY-NNNN numbering, overdue detection, paid/void transitions
- **Webhooks**: Signed notifications for pace-critical, campaign-completed, and invoice-paid events

## Authentication

Mutating endpoints (POST, PUT, PATCH, DELETE) require the static API key in
the `x-api-key` header when one is configured. Read endpoints are open so
dashboards can poll without credentials.

## Pagination

List endpoints accept:
- `page`: Page number (default: 1)
- `limit`: Items per page (default: 20, max: 100)
        "#,
        contact(
            name = "Artist Influence Engineering",
            email = "eng@artistinfluence.com",
            url = "https://artistinfluence.com"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "https://api.artistinfluence.com", description = "Production server"),
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Clients", description = "Client roster endpoints"),
        (name = "Campaign Groups", description = "Client-facing campaign package endpoints"),
        (name = "Campaigns", description = "Campaign lifecycle endpoints"),
        (name = "Delivery", description = "Vendor allocation and playlist placement endpoints"),
        (name = "Vendors", description = "Vendor roster and performance endpoints"),
        (name = "Invoices", description = "Client billing endpoints"),
        (name = "Dashboard", description = "Ops dashboard snapshot endpoints"),
    ),
    paths(
        // Clients
        crate::handlers::clients::list_clients,
        crate::handlers::clients::create_client,
        crate::handlers::clients::get_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::deactivate_client,

        // Campaign groups
        crate::handlers::campaign_groups::list_campaign_groups,
        crate::handlers::campaign_groups::create_campaign_group,
        crate::handlers::campaign_groups::get_campaign_group,
        crate::handlers::campaign_groups::update_campaign_group,
        crate::handlers::campaign_groups::delete_campaign_group,

        // Campaigns
        crate::handlers::campaigns::list_campaigns,
        crate::handlers::campaigns::create_campaign,
        crate::handlers::campaigns::get_campaign,
        crate::handlers::campaigns::update_campaign,
        crate::handlers::campaigns::update_campaign_status,
        crate::handlers::campaigns::cancel_campaign,

        // Delivery
        crate::handlers::delivery::list_allocations,
        crate::handlers::delivery::create_allocation,
        crate::handlers::delivery::delete_allocation,
        crate::handlers::delivery::list_placements,
        crate::handlers::delivery::create_placement,
        crate::handlers::delivery::delete_placement,
        crate::handlers::delivery::record_allocation_delivery,
        crate::handlers::delivery::update_allocation_payment,
        crate::handlers::delivery::record_placement_delivery,
        crate::handlers::delivery::update_placement_payment,

        // Vendors
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::deactivate_vendor,
        crate::handlers::vendors::get_vendor_performance,

        // Invoices
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::create_invoice,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::update_invoice_status,

        // Dashboard
        crate::handlers::dashboard::get_ops_status,
        crate::handlers::dashboard::get_alerts,
        crate::handlers::dashboard::get_platform_health,
        crate::handlers::dashboard::get_data_gaps,
        crate::handlers::dashboard::get_campaign_pacing,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Domain enums
            crate::models::Platform,
            crate::models::CampaignStatus,
            crate::models::PaymentStatus,
            crate::models::InvoiceStatus,
            crate::models::PaceStatus,
            crate::models::PacingBasis,
            crate::models::AlertSeverity,
            crate::models::AlertKind,

            // Client types
            crate::services::clients::ClientResponse,
            crate::services::clients::CreateClientRequest,
            crate::services::clients::UpdateClientRequest,

            // Campaign group types
            crate::services::campaign_groups::CampaignGroupResponse,
            crate::services::campaign_groups::CampaignGroupDetailResponse,
            crate::services::campaign_groups::CreateCampaignGroupRequest,
            crate::services::campaign_groups::UpdateCampaignGroupRequest,

            // Campaign types
            crate::services::campaigns::CampaignResponse,
            crate::services::campaigns::CampaignDetailResponse,
            crate::services::campaigns::CreateCampaignRequest,
            crate::services::campaigns::UpdateCampaignRequest,
            crate::services::campaigns::UpdateCampaignStatusRequest,
            crate::services::campaigns::CampaignFilters,

            // Delivery types
            crate::services::delivery::AllocationResponse,
            crate::services::delivery::PlacementResponse,
            crate::services::delivery::CreateAllocationRequest,
            crate::services::delivery::CreatePlacementRequest,
            crate::services::delivery::RecordDeliveryRequest,
            crate::services::delivery::UpdatePaymentStatusRequest,

            // Vendor types
            crate::services::vendors::VendorResponse,
            crate::services::vendors::VendorPerformanceResponse,
            crate::services::vendors::CreateVendorRequest,
            crate::services::vendors::UpdateVendorRequest,

            // Invoice types
            crate::services::invoices::InvoiceResponse,
            crate::services::invoices::CreateInvoiceRequest,
            crate::services::invoices::UpdateInvoiceStatusRequest,
            crate::services::invoices::InvoiceFilters,

            // Pacing and alert types
            crate::services::pacing::PacingReport,
            crate::services::alerts::Alert,
            crate::services::alerts::AlertSummary,

            // Dashboard types
            crate::handlers::dashboard::AlertFeedQuery,
            crate::services::dashboard::OpsStatusResponse,
            crate::services::dashboard::CampaignStatusCounts,
            crate::services::dashboard::PacingOverview,
            crate::services::dashboard::InvoiceOverview,
            crate::services::dashboard::PlatformHealthResponse,
            crate::services::dashboard::PlatformHealthEntry,
            crate::services::dashboard::DataGapsResponse,
            crate::services::dashboard::DataGapEntry,
            crate::services::dashboard::CampaignPacingResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "ApiKey",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_covers_core_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();

        assert!(json.contains("Artist Influence API"));
        assert!(json.contains("/api/v1/campaigns"));
        assert!(json.contains("/api/v1/dashboard/ops-status"));
        assert!(json.contains("/api/v1/allocations/{id}/delivery"));
    }

    #[test]
    fn openapi_document_registers_api_key_scheme() {
        let openapi = ApiDocV1::openapi();
        let components = openapi.components.expect("components expected");
        assert!(components.security_schemes.contains_key("ApiKey"));
    }
}
