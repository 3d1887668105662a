use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::campaign_group::{self, ActiveModel as GroupActiveModel, Entity as GroupEntity},
    entities::client::Entity as ClientEntity,
    errors::ServiceError,
    events::{Event, EventSender},
    services::dashboard::CampaignPacingResponse,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCampaignGroupRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 255, message = "Group name is required"))]
    pub name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCampaignGroupRequest {
    #[validate(length(min = 1, max = 255, message = "Group name cannot be empty"))]
    pub name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignGroupResponse {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignGroupListResponse {
    pub groups: Vec<CampaignGroupResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Group detail: the group itself plus a pacing rollup per member campaign.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CampaignGroupDetailResponse {
    #[serde(flatten)]
    pub group: CampaignGroupResponse,
    pub campaigns: Vec<CampaignPacingResponse>,
}

/// Service for grouping campaigns into client-facing packages
#[derive(Clone)]
pub struct CampaignGroupService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CampaignGroupService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(client_id = %request.client_id, name = %request.name))]
    pub async fn create_group(
        &self,
        request: CreateCampaignGroupRequest,
    ) -> Result<CampaignGroupResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;

        ClientEntity::find_by_id(request.client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", request.client_id))
            })?;

        let now = Utc::now();
        let group_id = Uuid::new_v4();

        let active_model = GroupActiveModel {
            id: Set(group_id),
            client_id: Set(request.client_id),
            name: Set(request.name.clone()),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, group_id = %group_id, "Failed to create campaign group");
            ServiceError::DatabaseError(e)
        })?;

        info!(group_id = %group_id, "Campaign group created");
        self.emit(Event::CampaignGroupCreated(group_id)).await;

        Ok(Self::model_to_response(model))
    }

    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn get_group(
        &self,
        group_id: Uuid,
    ) -> Result<Option<CampaignGroupResponse>, ServiceError> {
        let db = &*self.db_pool;
        let group = GroupEntity::find_by_id(group_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(group.map(Self::model_to_response))
    }

    /// Lists groups, optionally narrowed to one client.
    #[instrument(skip(self))]
    pub async fn list_groups(
        &self,
        client_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<CampaignGroupListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = GroupEntity::find().order_by_desc(campaign_group::Column::CreatedAt);
        if let Some(client_id) = client_id {
            query = query.filter(campaign_group::Column::ClientId.eq(client_id));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let groups = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(CampaignGroupListResponse {
            groups: groups.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(group_id = %group_id))]
    pub async fn update_group(
        &self,
        group_id: Uuid,
        request: UpdateCampaignGroupRequest,
    ) -> Result<CampaignGroupResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let group = GroupEntity::find_by_id(group_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign group {} not found", group_id)))?;

        let mut active_model: GroupActiveModel = group.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(notes) = request.notes {
            active_model.notes = Set(Some(notes));
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(group_id = %group_id, "Campaign group updated");
        self.emit(Event::CampaignGroupUpdated(group_id)).await;

        Ok(Self::model_to_response(updated))
    }

    /// Deletes a group. Member campaigns are kept and ungrouped by the
    /// `ON DELETE SET NULL` on their group reference.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn delete_group(&self, group_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let group = GroupEntity::find_by_id(group_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign group {} not found", group_id)))?;

        group.delete(db).await.map_err(|e| {
            error!(error = %e, group_id = %group_id, "Failed to delete campaign group");
            ServiceError::DatabaseError(e)
        })?;

        info!(group_id = %group_id, "Campaign group deleted");
        self.emit(Event::CampaignGroupDeleted(group_id)).await;

        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send campaign group event");
            }
        }
    }

    fn model_to_response(model: campaign_group::Model) -> CampaignGroupResponse {
        CampaignGroupResponse {
            id: model.id,
            client_id: model.client_id,
            name: model.name,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
