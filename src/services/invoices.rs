use chrono::{DateTime, Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
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
        campaign::Entity as CampaignEntity,
        client::Entity as ClientEntity,
        invoice::{self, ActiveModel as InvoiceActiveModel, Entity as InvoiceEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::OPS_METRICS,
    models::InvoiceStatus,
};

/// `INV-<year>-<sequence>`, e.g. `INV-2026-0041`.
static INVOICE_NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^INV-\d{4}-\d{4}$").expect("invoice number pattern is valid"));

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceRequest {
    pub client_id: Uuid,
    pub campaign_id: Option<Uuid>,
    /// Generated as `INV-<year>-<seq>` when omitted.
    pub invoice_number: Option<String>,
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInvoiceStatusRequest {
    pub status: InvoiceStatus,
}

/// Optional narrowing for invoice listings.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct InvoiceFilters {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub overdue_only: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub invoice_number: String,
    pub client_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for client invoicing
#[derive(Clone)]
pub struct InvoiceService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    default_currency: String,
}

impl InvoiceService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        default_currency: String,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            default_currency,
        }
    }

    #[instrument(skip(self, request), fields(client_id = %request.client_id))]
    pub async fn create_invoice(
        &self,
        request: CreateInvoiceRequest,
    ) -> Result<InvoiceResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Invoice amount must be positive".to_string(),
            ));
        }

        let today = Utc::now().date_naive();
        let issue_date = request.issue_date.unwrap_or(today);
        if request.due_date < issue_date {
            return Err(ServiceError::ValidationError(
                "Due date cannot precede the issue date".to_string(),
            ));
        }

        if let Some(number) = &request.invoice_number {
            if !INVOICE_NUMBER_PATTERN.is_match(number) {
                return Err(ServiceError::ValidationError(format!(
                    "Invoice number {} does not match INV-YYYY-NNNN",
                    number
                )));
            }
        }

        let db = &*self.db_pool;

        ClientEntity::find_by_id(request.client_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Client {} not found", request.client_id))
            })?;

        if let Some(campaign_id) = request.campaign_id {
            let campaign = CampaignEntity::find_by_id(campaign_id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Campaign {} not found", campaign_id))
                })?;

            if campaign.client_id != request.client_id {
                return Err(ServiceError::InvalidOperation(format!(
                    "Campaign {} belongs to a different client",
                    campaign_id
                )));
            }
        }

        let invoice_number = match request.invoice_number {
            Some(number) => number,
            None => self.next_invoice_number(today).await?,
        };

        let now = Utc::now();
        let invoice_id = Uuid::new_v4();

        let active_model = InvoiceActiveModel {
            id: Set(invoice_id),
            invoice_number: Set(invoice_number.clone()),
            client_id: Set(request.client_id),
            campaign_id: Set(request.campaign_id),
            amount: Set(request.amount),
            currency: Set(request
                .currency
                .unwrap_or_else(|| self.default_currency.clone())),
            issue_date: Set(issue_date),
            due_date: Set(request.due_date),
            status: Set(InvoiceStatus::Pending),
            paid_at: Set(None),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(db).await.map_err(|e| {
            // The invoice number carries a unique index; a duplicate lands here.
            error!(error = %e, invoice_number = %invoice_number, "Failed to create invoice");
            if e.to_string().to_lowercase().contains("unique") {
                ServiceError::Conflict(format!("Invoice number {} already exists", invoice_number))
            } else {
                ServiceError::DatabaseError(e)
            }
        })?;

        info!(invoice_id = %invoice_id, invoice_number = %invoice_number, "Invoice created");
        OPS_METRICS.record_invoice_created();
        self.emit(Event::InvoiceCreated(invoice_id)).await;

        Ok(Self::model_to_response(model, today))
    }

    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<InvoiceResponse>, ServiceError> {
        let db = &*self.db_pool;
        let invoice = InvoiceEntity::find_by_id(invoice_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let today = Utc::now().date_naive();
        Ok(invoice.map(|model| Self::model_to_response(model, today)))
    }

    #[instrument(skip(self, filters))]
    pub async fn list_invoices(
        &self,
        filters: InvoiceFilters,
        page: u64,
        per_page: u64,
    ) -> Result<InvoiceListResponse, ServiceError> {
        let db = &*self.db_pool;
        let today = Utc::now().date_naive();

        let mut query = InvoiceEntity::find().order_by_desc(invoice::Column::CreatedAt);
        if let Some(status) = filters.status {
            query = query.filter(invoice::Column::Status.eq(status));
        }
        if let Some(client_id) = filters.client_id {
            query = query.filter(invoice::Column::ClientId.eq(client_id));
        }
        if filters.overdue_only {
            query = query
                .filter(invoice::Column::Status.eq(InvoiceStatus::Pending))
                .filter(invoice::Column::DueDate.lt(today));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let invoices = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(InvoiceListResponse {
            invoices: invoices
                .into_iter()
                .map(|model| Self::model_to_response(model, today))
                .collect(),
            total,
            page,
            per_page,
        })
    }

    /// Moves an invoice to paid or void. Paid stamps `paid_at`; anything
    /// else the matrix forbids is rejected.
    #[instrument(skip(self, request), fields(invoice_id = %invoice_id, new_status = %request.status))]
    pub async fn update_invoice_status(
        &self,
        invoice_id: Uuid,
        request: UpdateInvoiceStatusRequest,
    ) -> Result<InvoiceResponse, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let invoice = InvoiceEntity::find_by_id(invoice_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Invoice {} not found", invoice_id)))?;

        let old_status = invoice.status;
        let new_status = request.status;
        if !old_status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot move invoice from {} to {}",
                old_status, new_status
            )));
        }

        let client_id = invoice.client_id;
        let amount = invoice.amount;

        let mut active_model: InvoiceActiveModel = invoice.into();
        active_model.status = Set(new_status);
        active_model.updated_at = Set(now);
        if new_status == InvoiceStatus::Paid {
            active_model.paid_at = Set(Some(now));
        }

        let updated = active_model.update(&txn).await.map_err(|e| {
            error!(error = %e, invoice_id = %invoice_id, "Failed to update invoice status");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            invoice_id = %invoice_id,
            old_status = %old_status,
            new_status = %new_status,
            "Invoice status changed"
        );

        self.emit(Event::InvoiceStatusChanged {
            invoice_id,
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
        })
        .await;

        match new_status {
            InvoiceStatus::Paid => {
                OPS_METRICS.record_invoice_paid();
                self.emit(Event::InvoicePaid {
                    invoice_id,
                    client_id,
                    amount,
                })
                .await;
            }
            InvoiceStatus::Void => {
                self.emit(Event::InvoiceVoided(invoice_id)).await;
            }
            InvoiceStatus::Pending => {}
        }

        Ok(Self::model_to_response(updated, Utc::now().date_naive()))
    }

    /// Next free number in this year's sequence. The unique index on the
    /// column backstops the race between concurrent creates.
    async fn next_invoice_number(&self, today: NaiveDate) -> Result<String, ServiceError> {
        let db = &*self.db_pool;
        let year = today.year();
        let prefix = format!("INV-{}-", year);

        let issued_this_year = InvoiceEntity::find()
            .filter(invoice::Column::InvoiceNumber.starts_with(prefix.as_str()))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(format!("INV-{}-{:04}", year, issued_this_year + 1))
    }

    async fn emit(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send invoice event");
            }
        }
    }

    fn model_to_response(model: invoice::Model, today: NaiveDate) -> InvoiceResponse {
        let is_overdue = model.is_overdue(today);
        let days_overdue = model.days_overdue(today);
        InvoiceResponse {
            id: model.id,
            invoice_number: model.invoice_number,
            client_id: model.client_id,
            campaign_id: model.campaign_id,
            amount: model.amount,
            currency: model.currency,
            issue_date: model.issue_date,
            due_date: model.due_date,
            status: model.status,
            is_overdue,
            days_overdue,
            paid_at: model.paid_at,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_number_pattern_accepts_expected_format() {
        assert!(INVOICE_NUMBER_PATTERN.is_match("INV-2026-0001"));
        assert!(INVOICE_NUMBER_PATTERN.is_match("INV-2026-9999"));
    }

    #[test]
    fn invoice_number_pattern_rejects_malformed_numbers() {
        assert!(!INVOICE_NUMBER_PATTERN.is_match("INV-26-0001"));
        assert!(!INVOICE_NUMBER_PATTERN.is_match("INV-2026-1"));
        assert!(!INVOICE_NUMBER_PATTERN.is_match("inv-2026-0001"));
        assert!(!INVOICE_NUMBER_PATTERN.is_match("INV-2026-00001"));
        assert!(!INVOICE_NUMBER_PATTERN.is_match("2026-0001"));
    }
}
