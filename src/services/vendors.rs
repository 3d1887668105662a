use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        allocation::{self, Entity as AllocationEntity},
        playlist_placement::{self, Entity as PlacementEntity},
        vendor::{self, ActiveModel as VendorActiveModel, Entity as VendorEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVendorRequest {
    #[validate(length(min = 1, max = 255, message = "Vendor name is required"))]
    pub name: String,
    #[validate(email(message = "Contact email must be a valid address"))]
    pub contact_email: Option<String>,
    pub cost_rate: Decimal,
    #[validate(range(min = 1, message = "Daily capacity must be positive"))]
    pub daily_capacity: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVendorRequest {
    #[validate(length(min = 1, max = 255, message = "Vendor name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Contact email must be a valid address"))]
    pub contact_email: Option<String>,
    pub cost_rate: Option<Decimal>,
    #[validate(range(min = 1, message = "Daily capacity must be positive"))]
    pub daily_capacity: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorResponse {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub cost_rate: Decimal,
    pub daily_capacity: Option<i64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorListResponse {
    pub vendors: Vec<VendorResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Delivery record across every campaign a vendor has worked.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VendorPerformanceResponse {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub campaigns_served: u64,
    pub allocations_count: u64,
    pub allocated_units: i64,
    pub delivered_units: i64,
    /// Delivered as a fraction of allocated; zero when nothing was allocated.
    pub fulfillment_rate: f64,
    pub placements_count: u64,
    pub placement_streams: i64,
    pub last_delivery_at: Option<DateTime<Utc>>,
}

/// Service for managing delivery vendors
#[derive(Clone)]
pub struct VendorService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl VendorService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(vendor_name = %request.name))]
    pub async fn create_vendor(
        &self,
        request: CreateVendorRequest,
    ) -> Result<VendorResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.cost_rate < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Cost rate cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let now = Utc::now();
        let vendor_id = Uuid::new_v4();

        let active_model = VendorActiveModel {
            id: Set(vendor_id),
            name: Set(request.name.clone()),
            contact_email: Set(request.contact_email),
            cost_rate: Set(request.cost_rate),
            daily_capacity: Set(request.daily_capacity),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, vendor_id = %vendor_id, "Failed to create vendor");
            ServiceError::DatabaseError(e)
        })?;

        info!(vendor_id = %vendor_id, "Vendor created");
        self.emit(Event::VendorCreated(vendor_id)).await;

        Ok(Self::model_to_response(model))
    }

    #[instrument(skip(self), fields(vendor_id = %vendor_id))]
    pub async fn get_vendor(&self, vendor_id: Uuid) -> Result<Option<VendorResponse>, ServiceError> {
        let db = &*self.db_pool;
        let vendor = VendorEntity::find_by_id(vendor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(vendor.map(Self::model_to_response))
    }

    #[instrument(skip(self))]
    pub async fn list_vendors(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<VendorListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = VendorEntity::find()
            .filter(vendor::Column::IsActive.eq(true))
            .order_by_desc(vendor::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let vendors = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(VendorListResponse {
            vendors: vendors.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(vendor_id = %vendor_id))]
    pub async fn update_vendor(
        &self,
        vendor_id: Uuid,
        request: UpdateVendorRequest,
    ) -> Result<VendorResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if matches!(request.cost_rate, Some(rate) if rate < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "Cost rate cannot be negative".to_string(),
            ));
        }

        let db = &*self.db_pool;
        let vendor = VendorEntity::find_by_id(vendor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        let mut active_model: VendorActiveModel = vendor.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(contact_email) = request.contact_email {
            active_model.contact_email = Set(Some(contact_email));
        }
        if let Some(cost_rate) = request.cost_rate {
            active_model.cost_rate = Set(cost_rate);
        }
        if let Some(daily_capacity) = request.daily_capacity {
            active_model.daily_capacity = Set(Some(daily_capacity));
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(vendor_id = %vendor_id, "Vendor updated");
        self.emit(Event::VendorUpdated(vendor_id)).await;

        Ok(Self::model_to_response(updated))
    }

    /// Soft-deactivates a vendor so no new allocations or placements can
    /// reference it. Existing bookings are untouched.
    #[instrument(skip(self), fields(vendor_id = %vendor_id))]
    pub async fn deactivate_vendor(&self, vendor_id: Uuid) -> Result<VendorResponse, ServiceError> {
        let db = &*self.db_pool;
        let vendor = VendorEntity::find_by_id(vendor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        if !vendor.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Vendor {} is already deactivated",
                vendor_id
            )));
        }

        let mut active_model: VendorActiveModel = vendor.into();
        active_model.is_active = Set(false);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(vendor_id = %vendor_id, "Vendor deactivated");
        self.emit(Event::VendorDeactivated(vendor_id)).await;

        Ok(Self::model_to_response(updated))
    }

    /// Rolls up a vendor's delivery record across allocations and placements.
    #[instrument(skip(self), fields(vendor_id = %vendor_id))]
    pub async fn vendor_performance(
        &self,
        vendor_id: Uuid,
    ) -> Result<VendorPerformanceResponse, ServiceError> {
        let db = &*self.db_pool;
        let vendor = VendorEntity::find_by_id(vendor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        let allocations = AllocationEntity::find()
            .filter(allocation::Column::VendorId.eq(vendor_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let placements = PlacementEntity::find()
            .filter(playlist_placement::Column::VendorId.eq(vendor_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut campaigns: HashSet<Uuid> = HashSet::new();
        let mut last_delivery_at: Option<DateTime<Utc>> = None;

        let allocated_units: i64 = allocations.iter().map(|a| a.allocated_units).sum();
        let delivered_units: i64 = allocations.iter().map(|a| a.delivered_units).sum();
        for a in &allocations {
            campaigns.insert(a.campaign_id);
            last_delivery_at = match (last_delivery_at, a.last_delivery_at) {
                (Some(current), Some(at)) => Some(current.max(at)),
                (None, at) => at,
                (current, None) => current,
            };
        }

        let placement_streams: i64 = placements.iter().map(|p| p.streams_delivered).sum();
        for p in &placements {
            campaigns.insert(p.campaign_id);
            last_delivery_at = match (last_delivery_at, p.last_delivery_at) {
                (Some(current), Some(at)) => Some(current.max(at)),
                (None, at) => at,
                (current, None) => current,
            };
        }

        let fulfillment_rate = if allocated_units > 0 {
            delivered_units as f64 / allocated_units as f64
        } else {
            0.0
        };

        Ok(VendorPerformanceResponse {
            vendor_id,
            vendor_name: vendor.name,
            campaigns_served: campaigns.len() as u64,
            allocations_count: allocations.len() as u64,
            allocated_units,
            delivered_units,
            fulfillment_rate,
            placements_count: placements.len() as u64,
            placement_streams,
            last_delivery_at,
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send vendor event");
            }
        }
    }

    fn model_to_response(model: vendor::Model) -> VendorResponse {
        VendorResponse {
            id: model.id,
            name: model.name,
            contact_email: model.contact_email,
            cost_rate: model.cost_rate,
            daily_capacity: model.daily_capacity,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
