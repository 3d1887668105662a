use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Third-party playlist/content placement supplier paid per unit of
/// delivered engagement.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Vendor name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(email(message = "Vendor contact email must be a valid address"))]
    pub contact_email: Option<String>,

    /// Cost per delivered stream/view.
    pub cost_rate: Decimal,

    /// Capacity ceiling in units per day, when the vendor enforces one.
    pub daily_capacity: Option<i64>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::allocation::Entity")]
    Allocations,
    #[sea_orm(has_many = "super::playlist_placement::Entity")]
    PlaylistPlacements,
}

impl Related<super::allocation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Allocations.def()
    }
}

impl Related<super::playlist_placement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlaylistPlacements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
