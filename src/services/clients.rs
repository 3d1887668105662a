use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::client::{self, ActiveModel as ClientActiveModel, Entity as ClientEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 255, message = "Client name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientListResponse {
    pub clients: Vec<ClientResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for managing promotion clients
#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(client_name = %request.name))]
    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> Result<ClientResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let client_id = Uuid::new_v4();

        let active_model = ClientActiveModel {
            id: Set(client_id),
            name: Set(request.name.clone()),
            email: Set(request.email),
            company: Set(request.company),
            notes: Set(request.notes),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to create client");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = %client_id, "Client created");
        self.emit(Event::ClientCreated(client_id)).await;

        Ok(Self::model_to_response(model))
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn get_client(&self, client_id: Uuid) -> Result<Option<ClientResponse>, ServiceError> {
        let db = &*self.db_pool;
        let client = ClientEntity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(client.map(Self::model_to_response))
    }

    /// Lists active clients with pagination, newest first.
    #[instrument(skip(self))]
    pub async fn list_clients(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<ClientListResponse, ServiceError> {
        let db = &*self.db_pool;

        let paginator = ClientEntity::find()
            .filter(client::Column::IsActive.eq(true))
            .order_by_desc(client::Column::CreatedAt)
            .paginate(db, per_page);

        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let clients = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(ClientListResponse {
            clients: clients.into_iter().map(Self::model_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, request), fields(client_id = %client_id))]
    pub async fn update_client(
        &self,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<ClientResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let client = ClientEntity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))?;

        let mut active_model: ClientActiveModel = client.into();
        if let Some(name) = request.name {
            active_model.name = Set(name);
        }
        if let Some(email) = request.email {
            active_model.email = Set(Some(email));
        }
        if let Some(company) = request.company {
            active_model.company = Set(Some(company));
        }
        if let Some(notes) = request.notes {
            active_model.notes = Set(Some(notes));
        }
        active_model.updated_at = Set(Utc::now());

        let updated = active_model.update(db).await.map_err(|e| {
            error!(error = %e, client_id = %client_id, "Failed to update client");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = %client_id, "Client updated");
        self.emit(Event::ClientUpdated(client_id)).await;

        Ok(Self::model_to_response(updated))
    }

    /// Soft-deactivates a client. History and invoices stay queryable by id.
    #[instrument(skip(self), fields(client_id = %client_id))]
    pub async fn deactivate_client(&self, client_id: Uuid) -> Result<ClientResponse, ServiceError> {
        let db = &*self.db_pool;
        let client = ClientEntity::find_by_id(client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", client_id)))?;

        if !client.is_active {
            return Err(ServiceError::InvalidOperation(format!(
                "Client {} is already deactivated",
                client_id
            )));
        }

        let mut active_model: ClientActiveModel = client.into();
        active_model.is_active = Set(false);
        active_model.updated_at = Set(Utc::now());

        let updated = active_model
            .update(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        info!(client_id = %client_id, "Client deactivated");
        self.emit(Event::ClientDeactivated(client_id)).await;

        Ok(Self::model_to_response(updated))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send client event");
            }
        }
    }

    fn model_to_response(model: client::Model) -> ClientResponse {
        ClientResponse {
            id: model.id,
            name: model.name,
            email: model.email,
            company: model.company,
            notes: model.notes,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
