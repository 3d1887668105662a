use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        allocation::{self, ActiveModel as AllocationActiveModel, Entity as AllocationEntity},
        campaign::{self, ActiveModel as CampaignActiveModel, Entity as CampaignEntity},
        playlist_placement::{
            self, ActiveModel as PlacementActiveModel, Entity as PlacementEntity,
        },
        vendor::Entity as VendorEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::OPS_METRICS,
    models::{CampaignStatus, PaceStatus, PaymentStatus},
    services::pacing::{evaluate_pacing, PaceThresholds, PacingInput},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAllocationRequest {
    pub vendor_id: Uuid,
    #[validate(range(min = 1, message = "Allocated units must be positive"))]
    pub allocated_units: i64,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePlacementRequest {
    pub vendor_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Playlist name is required"))]
    pub playlist_name: String,
    #[validate(url(message = "Playlist URL must be a valid URL"))]
    pub playlist_url: Option<String>,
    #[validate(range(min = 1, message = "Position must be positive"))]
    pub position: Option<i32>,
    pub placed_at: Option<NaiveDate>,
}

/// New cumulative delivered total for an allocation or placement. Totals only
/// move forward; a lower figure than the stored one is rejected.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordDeliveryRequest {
    #[validate(range(min = 0, message = "Delivered units cannot be negative"))]
    pub delivered_units: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AllocationResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub vendor_id: Uuid,
    pub allocated_units: i64,
    pub delivered_units: i64,
    pub payment_status: PaymentStatus,
    pub cost: Option<Decimal>,
    pub last_delivery_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<allocation::Model> for AllocationResponse {
    fn from(model: allocation::Model) -> Self {
        Self {
            id: model.id,
            campaign_id: model.campaign_id,
            vendor_id: model.vendor_id,
            allocated_units: model.allocated_units,
            delivered_units: model.delivered_units,
            payment_status: model.payment_status,
            cost: model.cost,
            last_delivery_at: model.last_delivery_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlacementResponse {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub vendor_id: Uuid,
    pub playlist_name: String,
    pub playlist_url: Option<String>,
    pub position: Option<i32>,
    pub streams_delivered: i64,
    pub payment_status: PaymentStatus,
    pub placed_at: Option<NaiveDate>,
    pub last_delivery_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<playlist_placement::Model> for PlacementResponse {
    fn from(model: playlist_placement::Model) -> Self {
        Self {
            id: model.id,
            campaign_id: model.campaign_id,
            vendor_id: model.vendor_id,
            playlist_name: model.playlist_name,
            playlist_url: model.playlist_url,
            position: model.position,
            streams_delivered: model.streams_delivered,
            payment_status: model.payment_status,
            placed_at: model.placed_at,
            last_delivery_at: model.last_delivery_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Service for vendor allocations, playlist placements and delivery ingestion
#[derive(Clone)]
pub struct DeliveryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    thresholds: PaceThresholds,
}

impl DeliveryService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        thresholds: PaceThresholds,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            thresholds,
        }
    }

    /// Books a block of units with a vendor for a campaign.
    #[instrument(skip(self, request), fields(campaign_id = %campaign_id, vendor_id = %request.vendor_id))]
    pub async fn create_allocation(
        &self,
        campaign_id: Uuid,
        request: CreateAllocationRequest,
    ) -> Result<AllocationResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        self.writable_campaign(campaign_id).await?;
        self.active_vendor(request.vendor_id).await?;

        let now = Utc::now();
        let allocation_id = Uuid::new_v4();

        let active_model = AllocationActiveModel {
            id: Set(allocation_id),
            campaign_id: Set(campaign_id),
            vendor_id: Set(request.vendor_id),
            allocated_units: Set(request.allocated_units),
            delivered_units: Set(0),
            payment_status: Set(PaymentStatus::Unpaid),
            cost: Set(request.cost),
            last_delivery_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, allocation_id = %allocation_id, "Failed to create allocation");
            ServiceError::DatabaseError(e)
        })?;

        info!(allocation_id = %allocation_id, campaign_id = %campaign_id, "Allocation created");
        self.emit(Event::AllocationCreated {
            campaign_id,
            allocation_id,
        })
        .await;

        Ok(model.into())
    }

    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn list_allocations(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<AllocationResponse>, ServiceError> {
        let db = &*self.db_pool;
        self.campaign(campaign_id).await?;

        let allocations = AllocationEntity::find()
            .filter(allocation::Column::CampaignId.eq(campaign_id))
            .order_by_desc(allocation::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(allocations.into_iter().map(Into::into).collect())
    }

    /// Removes a mis-entered allocation. Bookings are part of the delivery
    /// record once a campaign leaves draft, so only draft campaigns allow it.
    #[instrument(skip(self), fields(allocation_id = %allocation_id))]
    pub async fn delete_allocation(&self, allocation_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let allocation = AllocationEntity::find_by_id(allocation_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Allocation {} not found", allocation_id))
            })?;

        let campaign_id = allocation.campaign_id;
        self.draft_campaign(campaign_id).await?;

        allocation.delete(db).await.map_err(|e| {
            error!(error = %e, allocation_id = %allocation_id, "Failed to delete allocation");
            ServiceError::DatabaseError(e)
        })?;

        info!(allocation_id = %allocation_id, campaign_id = %campaign_id, "Allocation deleted");
        self.emit(Event::AllocationDeleted {
            campaign_id,
            allocation_id,
        })
        .await;

        Ok(())
    }

    /// Records a playlist pitch landing on a playlist.
    #[instrument(skip(self, request), fields(campaign_id = %campaign_id, vendor_id = %request.vendor_id))]
    pub async fn create_placement(
        &self,
        campaign_id: Uuid,
        request: CreatePlacementRequest,
    ) -> Result<PlacementResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        self.writable_campaign(campaign_id).await?;
        self.active_vendor(request.vendor_id).await?;

        let now = Utc::now();
        let placement_id = Uuid::new_v4();

        let active_model = PlacementActiveModel {
            id: Set(placement_id),
            campaign_id: Set(campaign_id),
            vendor_id: Set(request.vendor_id),
            playlist_name: Set(request.playlist_name),
            playlist_url: Set(request.playlist_url),
            position: Set(request.position),
            streams_delivered: Set(0),
            payment_status: Set(PaymentStatus::Unpaid),
            placed_at: Set(request.placed_at),
            last_delivery_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, placement_id = %placement_id, "Failed to create placement");
            ServiceError::DatabaseError(e)
        })?;

        info!(placement_id = %placement_id, campaign_id = %campaign_id, "Placement created");
        self.emit(Event::PlacementCreated {
            campaign_id,
            placement_id,
        })
        .await;

        Ok(model.into())
    }

    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn list_placements(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<PlacementResponse>, ServiceError> {
        let db = &*self.db_pool;
        self.campaign(campaign_id).await?;

        let placements = PlacementEntity::find()
            .filter(playlist_placement::Column::CampaignId.eq(campaign_id))
            .order_by_desc(playlist_placement::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(placements.into_iter().map(Into::into).collect())
    }

    /// Removes a mis-entered placement. Same draft-only rule as allocations.
    #[instrument(skip(self), fields(placement_id = %placement_id))]
    pub async fn delete_placement(&self, placement_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let placement = PlacementEntity::find_by_id(placement_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Placement {} not found", placement_id))
            })?;

        let campaign_id = placement.campaign_id;
        self.draft_campaign(campaign_id).await?;

        placement.delete(db).await.map_err(|e| {
            error!(error = %e, placement_id = %placement_id, "Failed to delete placement");
            ServiceError::DatabaseError(e)
        })?;

        info!(placement_id = %placement_id, campaign_id = %campaign_id, "Placement deleted");
        self.emit(Event::PlacementDeleted {
            campaign_id,
            placement_id,
        })
        .await;

        Ok(())
    }

    /// Updates an allocation's cumulative delivered total.
    ///
    /// Equal totals are accepted as an idempotent no-op; only a strictly
    /// higher total stamps `last_delivery_at`, touches the campaign and
    /// triggers a pace re-check.
    #[instrument(skip(self, request), fields(allocation_id = %allocation_id))]
    pub async fn record_allocation_delivery(
        &self,
        allocation_id: Uuid,
        request: RecordDeliveryRequest,
    ) -> Result<AllocationResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let allocation = AllocationEntity::find_by_id(allocation_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Allocation {} not found", allocation_id))
            })?;

        let previous = allocation.delivered_units;
        let new_total = request.delivered_units;

        if new_total < previous {
            return Err(ServiceError::InvalidOperation(format!(
                "Delivered total cannot decrease ({} -> {})",
                previous, new_total
            )));
        }
        if new_total == previous {
            return Ok(allocation.into());
        }

        let campaign_id = allocation.campaign_id;
        self.writable_campaign(campaign_id).await?;

        let now = Utc::now();
        let units_added = new_total - previous;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let mut active_model: AllocationActiveModel = allocation.into();
        active_model.delivered_units = Set(new_total);
        active_model.last_delivery_at = Set(Some(now));
        active_model.updated_at = Set(now);
        let updated = active_model
            .update(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Self::touch_campaign(&txn, campaign_id, now).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, allocation_id = %allocation_id, "Failed to commit delivery update");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            allocation_id = %allocation_id,
            campaign_id = %campaign_id,
            units_added,
            total = new_total,
            "Allocation delivery recorded"
        );
        OPS_METRICS.record_delivery(units_added as u64);
        self.emit(Event::DeliveryRecorded {
            campaign_id,
            source_id: allocation_id,
            source_type: "allocation".to_string(),
            units_added,
            total_delivered: new_total,
        })
        .await;

        self.pace_recheck(campaign_id).await?;

        Ok(updated.into())
    }

    /// Updates a placement's cumulative streams total. Same rules as
    /// allocation deliveries.
    #[instrument(skip(self, request), fields(placement_id = %placement_id))]
    pub async fn record_placement_delivery(
        &self,
        placement_id: Uuid,
        request: RecordDeliveryRequest,
    ) -> Result<PlacementResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let placement = PlacementEntity::find_by_id(placement_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Placement {} not found", placement_id))
            })?;

        let previous = placement.streams_delivered;
        let new_total = request.delivered_units;

        if new_total < previous {
            return Err(ServiceError::InvalidOperation(format!(
                "Delivered total cannot decrease ({} -> {})",
                previous, new_total
            )));
        }
        if new_total == previous {
            return Ok(placement.into());
        }

        let campaign_id = placement.campaign_id;
        self.writable_campaign(campaign_id).await?;

        let now = Utc::now();
        let units_added = new_total - previous;

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let mut active_model: PlacementActiveModel = placement.into();
        active_model.streams_delivered = Set(new_total);
        active_model.last_delivery_at = Set(Some(now));
        active_model.updated_at = Set(now);
        let updated = active_model
            .update(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Self::touch_campaign(&txn, campaign_id, now).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, placement_id = %placement_id, "Failed to commit delivery update");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            placement_id = %placement_id,
            campaign_id = %campaign_id,
            units_added,
            total = new_total,
            "Placement delivery recorded"
        );
        OPS_METRICS.record_delivery(units_added as u64);
        self.emit(Event::DeliveryRecorded {
            campaign_id,
            source_id: placement_id,
            source_type: "placement".to_string(),
            units_added,
            total_delivered: new_total,
        })
        .await;

        self.pace_recheck(campaign_id).await?;

        Ok(updated.into())
    }

    #[instrument(skip(self, request), fields(allocation_id = %allocation_id))]
    pub async fn update_allocation_payment(
        &self,
        allocation_id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<AllocationResponse, ServiceError> {
        let db = &*self.db_pool;
        let allocation = AllocationEntity::find_by_id(allocation_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Allocation {} not found", allocation_id))
            })?;

        let mut active_model: AllocationActiveModel = allocation.into();
        active_model.payment_status = Set(request.payment_status);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(
            allocation_id = %allocation_id,
            payment_status = %request.payment_status,
            "Allocation payment status updated"
        );

        Ok(updated.into())
    }

    #[instrument(skip(self, request), fields(placement_id = %placement_id))]
    pub async fn update_placement_payment(
        &self,
        placement_id: Uuid,
        request: UpdatePaymentStatusRequest,
    ) -> Result<PlacementResponse, ServiceError> {
        let db = &*self.db_pool;
        let placement = PlacementEntity::find_by_id(placement_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Placement {} not found", placement_id))
            })?;

        let mut active_model: PlacementActiveModel = placement.into();
        active_model.payment_status = Set(request.payment_status);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(
            placement_id = %placement_id,
            payment_status = %request.payment_status,
            "Placement payment status updated"
        );

        Ok(updated.into())
    }

    /// Re-evaluates pace after new delivery lands and raises the critical
    /// event when an active campaign has fallen under the critical threshold.
    async fn pace_recheck(&self, campaign_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        if campaign.status != CampaignStatus::Active {
            return Ok(());
        }

        let allocations = AllocationEntity::find()
            .filter(allocation::Column::CampaignId.eq(campaign_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let allocation_units: i64 = allocations.iter().map(|a| a.delivered_units).sum();

        let placements = PlacementEntity::find()
            .filter(playlist_placement::Column::CampaignId.eq(campaign_id))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let placement_units: i64 = placements.iter().map(|p| p.streams_delivered).sum();

        let report = evaluate_pacing(
            &PacingInput {
                goal: campaign.goal,
                start_date: campaign.start_date,
                duration_days: campaign.duration_days,
                allocation_units,
                placement_units,
            },
            self.thresholds,
            Utc::now().date_naive(),
        );
        OPS_METRICS.record_pace_evaluation();

        if report.status == PaceStatus::Critical {
            warn!(
                campaign_id = %campaign_id,
                pace = format!("{:.2}", report.pace),
                "Delivery update left campaign critically behind pace"
            );
            self.emit(Event::CampaignPaceCritical {
                campaign_id,
                pace: report.pace,
                expected_units: report.expected_units,
                actual_units: report.actual_units,
            })
            .await;
        }

        Ok(())
    }

    async fn campaign(&self, campaign_id: Uuid) -> Result<campaign::Model, ServiceError> {
        let db = &*self.db_pool;
        CampaignEntity::find_by_id(campaign_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))
    }

    /// Cancelled campaigns take no further bookings or delivery data.
    async fn writable_campaign(&self, campaign_id: Uuid) -> Result<campaign::Model, ServiceError> {
        let campaign = self.campaign(campaign_id).await?;
        if campaign.status == CampaignStatus::Cancelled {
            return Err(ServiceError::InvalidOperation(format!(
                "Campaign {} is cancelled",
                campaign_id
            )));
        }
        Ok(campaign)
    }

    async fn draft_campaign(&self, campaign_id: Uuid) -> Result<campaign::Model, ServiceError> {
        let campaign = self.campaign(campaign_id).await?;
        if campaign.status != CampaignStatus::Draft {
            return Err(ServiceError::InvalidOperation(format!(
                "Campaign {} is {}; bookings can only be removed while it is in draft",
                campaign_id, campaign.status
            )));
        }
        Ok(campaign)
    }

    async fn active_vendor(&self, vendor_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let vendor = VendorEntity::find_by_id(vendor_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Vendor {} not found", vendor_id)))?;

        if !vendor.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Vendor {} is deactivated",
                vendor_id
            )));
        }
        Ok(())
    }

    async fn touch_campaign(
        txn: &sea_orm::DatabaseTransaction,
        campaign_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        let mut active_model: CampaignActiveModel = campaign.into();
        active_model.updated_at = Set(now);
        active_model
            .update(txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send delivery event");
            }
        }
    }
}
