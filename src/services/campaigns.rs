use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
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
        allocation::{self, Entity as AllocationEntity},
        campaign::{self, ActiveModel as CampaignActiveModel, Entity as CampaignEntity},
        campaign_group::Entity as GroupEntity,
        client::Entity as ClientEntity,
        playlist_placement::{self, Entity as PlacementEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::OPS_METRICS,
    models::{CampaignStatus, Platform},
    services::delivery::{AllocationResponse, PlacementResponse},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCampaignRequest {
    pub client_id: Uuid,
    pub campaign_group_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Campaign name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 255, message = "Artist name is required"))]
    pub artist_name: String,
    pub platform: Platform,
    #[validate(url(message = "Track URL must be a valid URL"))]
    pub track_url: Option<String>,
    #[validate(range(min = 1, message = "Goal must be positive"))]
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 3650, message = "Duration must be between 1 and 3650 days"))]
    pub duration_days: Option<i32>,
    pub budget: Option<Decimal>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCampaignRequest {
    pub campaign_group_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255, message = "Campaign name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Artist name cannot be empty"))]
    pub artist_name: Option<String>,
    #[validate(url(message = "Track URL must be a valid URL"))]
    pub track_url: Option<String>,
    #[validate(range(min = 1, message = "Goal must be positive"))]
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 3650, message = "Duration must be between 1 and 3650 days"))]
    pub duration_days: Option<i32>,
    pub budget: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCampaignStatusRequest {
    pub status: CampaignStatus,
}

/// Optional narrowing for campaign listings.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct CampaignFilters {
    pub status: Option<CampaignStatus>,
    pub platform: Option<Platform>,
    pub client_id: Option<Uuid>,
    pub campaign_group_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub campaign_group_id: Option<Uuid>,
    pub name: String,
    pub artist_name: String,
    pub platform: Platform,
    pub track_url: Option<String>,
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
    pub end_date: Option<NaiveDate>,
    pub status: CampaignStatus,
    pub budget: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignDetailResponse {
    #[serde(flatten)]
    pub campaign: CampaignResponse,
    pub allocations: Vec<AllocationResponse>,
    pub placements: Vec<PlacementResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing promotion campaigns
#[derive(Clone)]
pub struct CampaignService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CampaignService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a campaign in draft status.
    #[instrument(skip(self, request), fields(client_id = %request.client_id, name = %request.name))]
    pub async fn create_campaign(
        &self,
        request: CreateCampaignRequest,
    ) -> Result<CampaignResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        let client = ClientEntity::find_by_id(request.client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", request.client_id))
            })?;

        if !client.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Client {} is deactivated",
                client.id
            )));
        }

        if let Some(group_id) = request.campaign_group_id {
            let group = GroupEntity::find_by_id(group_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Campaign group {} not found", group_id))
                })?;

            if group.client_id != request.client_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Campaign group {} belongs to a different client",
                    group_id
                )));
            }
        }

        let now = Utc::now();
        let campaign_id = Uuid::new_v4();

        let active_model = CampaignActiveModel {
            id: Set(campaign_id),
            campaign_group_id: Set(request.campaign_group_id),
            client_id: Set(request.client_id),
            name: Set(request.name.clone()),
            artist_name: Set(request.artist_name),
            platform: Set(request.platform),
            track_url: Set(request.track_url),
            goal: Set(request.goal),
            start_date: Set(request.start_date),
            duration_days: Set(request.duration_days),
            status: Set(CampaignStatus::Draft),
            budget: Set(request.budget),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, campaign_id = %campaign_id, "Failed to create campaign");
            ServiceError::DatabaseError(e)
        })?;

        info!(campaign_id = %campaign_id, "Campaign created");
        OPS_METRICS.record_campaign_created();
        self.emit(Event::CampaignCreated(campaign_id)).await;

        Ok(Self::model_to_response(model))
    }

    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn get_campaign(
        &self,
        campaign_id: Uuid,
    ) -> Result<Option<CampaignResponse>, ServiceError> {
        let db = &*self.db_pool;
        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(campaign.map(Self::model_to_response))
    }

    /// Campaign plus its vendor allocations and playlist placements.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn get_campaign_detail(
        &self,
        campaign_id: Uuid,
    ) -> Result<Option<CampaignDetailResponse>, ServiceError> {
        let db = &*self.db_pool;
        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let Some(campaign) = campaign else {
            return Ok(None);
        };

        let allocations = AllocationEntity::find()
            .filter(allocation::Column::CampaignId.eq(campaign_id))
            .order_by_desc(allocation::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let placements = PlacementEntity::find()
            .filter(playlist_placement::Column::CampaignId.eq(campaign_id))
            .order_by_desc(playlist_placement::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(Some(CampaignDetailResponse {
            campaign: Self::model_to_response(campaign),
            allocations: allocations
                .into_iter()
                .map(AllocationResponse::from)
                .collect(),
            placements: placements.into_iter().map(PlacementResponse::from).collect(),
        }))
    }

    #[instrument(skip(self, filters))]
    pub async fn list_campaigns(
        &self,
        filters: CampaignFilters,
        page: u64,
        per_page: u64,
    ) -> Result<CampaignListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = CampaignEntity::find().order_by_desc(campaign::Column::CreatedAt);
        if let Some(status) = filters.status {
            query = query.filter(campaign::Column::Status.eq(status));
        }
        if let Some(platform) = filters.platform {
            query = query.filter(campaign::Column::Platform.eq(platform));
        }
        if let Some(client_id) = filters.client_id {
            query = query.filter(campaign::Column::ClientId.eq(client_id));
        }
        if let Some(group_id) = filters.campaign_group_id {
            query = query.filter(campaign::Column::CampaignGroupId.eq(group_id));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let campaigns = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(CampaignListResponse {
            campaigns: campaigns.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Updates campaign fields. Terminal campaigns are immutable.
    #[instrument(skip(self, request), fields(campaign_id = %campaign_id))]
    pub async fn update_campaign(
        &self,
        campaign_id: Uuid,
        request: UpdateCampaignRequest,
    ) -> Result<CampaignResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        if campaign.status.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "Campaign {} is {} and can no longer be edited",
                campaign_id, campaign.status
            )));
        }

        if let Some(group_id) = request.campaign_group_id {
            let group = GroupEntity::find_by_id(group_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Campaign group {} not found", group_id))
                })?;

            if group.client_id != campaign.client_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Campaign group {} belongs to a different client",
                    group_id
                )));
            }
        }

        let mut active_model: CampaignActiveModel = campaign.into();
        if let Some(group_id) = request.campaign_group_id {
            active_model.campaign_group_id = Set(Some(group_id));
        }
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(artist_name) = request.artist_name {
            active_model.artist_name = Set(artist_name);
        }
        if let Some(track_url) = request.track_url {
            active_model.track_url = Set(Some(track_url));
        }
        if let Some(goal) = request.goal {
            active_model.goal = Set(Some(goal));
        }
        if let Some(start_date) = request.start_date {
            active_model.start_date = Set(Some(start_date));
        }
        if let Some(duration_days) = request.duration_days {
            active_model.duration_days = Set(Some(duration_days));
        }
        if let Some(budget) = request.budget {
            active_model.budget = Set(Some(budget));
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(db).await.map_err(|e| {
            error!(error = %e, campaign_id = %campaign_id, "Failed to update campaign");
            ServiceError::DatabaseError(e)
        })?;

        info!(campaign_id = %campaign_id, "Campaign updated");
        self.emit(Event::CampaignUpdated(campaign_id)).await;

        Ok(Self::model_to_response(updated))
    }

    /// Moves a campaign along the status lifecycle, rejecting transitions the
    /// matrix does not allow.
    #[instrument(skip(self, request), fields(campaign_id = %campaign_id, new_status = %request.status))]
    pub async fn update_campaign_status(
        &self,
        campaign_id: Uuid,
        request: UpdateCampaignStatusRequest,
    ) -> Result<CampaignResponse, ServiceError> {
        self.transition(campaign_id, request.status).await
    }

    /// Cancels a campaign from any non-terminal status.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn cancel_campaign(&self, campaign_id: Uuid) -> Result<CampaignResponse, ServiceError> {
        self.transition(campaign_id, CampaignStatus::Cancelled).await
    }

    async fn transition(
        &self,
        campaign_id: Uuid,
        new_status: CampaignStatus,
    ) -> Result<CampaignResponse, ServiceError> {
        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, campaign_id = %campaign_id, "Failed to start status transaction");
            ServiceError::DatabaseError(e)
        })?;

        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        let old_status = campaign.status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move campaign from {} to {}",
                old_status, new_status
            )));
        }

        let mut active_model: CampaignActiveModel = campaign.into();
        active_model.status = Set(new_status);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, campaign_id = %campaign_id, "Failed to update campaign status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, campaign_id = %campaign_id, "Failed to commit status transition");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            campaign_id = %campaign_id,
            old_status = %old_status,
            new_status = %new_status,
            "Campaign status changed"
        );

        self.emit(Event::CampaignStatusChanged {
            campaign_id,
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
        })
        .await;

        match new_status {
            CampaignStatus::Complete => {
                OPS_METRICS.record_campaign_completed();
                self.emit(Event::CampaignCompleted(campaign_id)).await;
            }
            CampaignStatus::Cancelled => {
                OPS_METRICS.record_campaign_cancelled();
                self.emit(Event::CampaignCancelled(campaign_id)).await;
            }
            _ => {}
        }

        Ok(Self::model_to_response(updated))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send campaign event");
            }
        }
    }

    fn model_to_response(model: campaign::Model) -> CampaignResponse {
        let end_date = model.end_date();
        CampaignResponse {
            id: model.id,
            client_id: model.client_id,
            campaign_group_id: model.campaign_group_id,
            name: model.name,
            artist_name: model.artist_name,
            platform: model.platform,
            track_url: model.track_url,
            goal: model.goal,
            start_date: model.start_date,
            duration_days: model.duration_days,
            end_date,
            status: model.status,
            budget: model.budget,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
