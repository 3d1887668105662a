use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    #[validate(length(
        min = 1,
        max = 50,
        message = "Invoice number must be between 1 and 50 characters"
    ))]
    pub invoice_number: String,

    pub client_id: Uuid,
    pub campaign_id: Option<Uuid>,

    pub amount: Decimal,

    #[validate(length(equal = 3, message = "Currency must be a 3-letter ISO code"))]
    pub currency: String,

    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// An invoice is overdue while still pending past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Pending && self.due_date < today
    }

    /// Whole days past due; zero when not overdue.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue(today) {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::campaign::Entity",
        from = "Column::CampaignId",
        to = "super::campaign::Column::Id"
    )]
    Campaign,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::campaign::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaign.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(
        mut self,
        _db: &C,
        insert: bool,
    ) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert && self.id.is_not_set() {
            self.id = Set(Uuid::new_v4());
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(status: InvoiceStatus, due: NaiveDate) -> Model {
        Model {
            id: Uuid::new_v4(),
            invoice_number: "INV-2025-0001".into(),
            client_id: Uuid::new_v4(),
            campaign_id: None,
            amount: dec!(1500.00),
            currency: "USD".into(),
            issue_date: due - chrono::Duration::days(30),
            due_date: due,
            status,
            paid_at: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn overdue_only_while_pending() {
        let due = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();

        assert!(invoice(InvoiceStatus::Pending, due).is_overdue(today));
        assert!(!invoice(InvoiceStatus::Paid, due).is_overdue(today));
        assert!(!invoice(InvoiceStatus::Void, due).is_overdue(today));
        assert_eq!(invoice(InvoiceStatus::Pending, due).days_overdue(today), 14);
    }

    #[test]
    fn due_today_is_not_overdue() {
        let due = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(!invoice(InvoiceStatus::Pending, due).is_overdue(due));
        assert_eq!(invoice(InvoiceStatus::Pending, due).days_overdue(due), 0);
    }
}
