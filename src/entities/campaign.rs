use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{CampaignStatus, Platform};

/// A single per-platform promotion campaign (a Spotify "song" campaign, a
/// YouTube video push, an Instagram or SoundCloud run).
///
/// `goal`, `start_date`, and `duration_days` are individually optional:
/// imported rows routinely arrive with holes, and pacing resolves the gap
/// explicitly instead of rejecting the row.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub campaign_group_id: Option<Uuid>,
    pub client_id: Uuid,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Campaign name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(max = 255, message = "Artist name must be at most 255 characters"))]
    pub artist_name: String,

    pub platform: Platform,

    #[validate(url(message = "Track URL must be a valid URL"))]
    pub track_url: Option<String>,

    /// Goal metric in streams/views. Positive when present.
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,

    pub status: CampaignStatus,
    pub budget: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Derived end date, when both start and duration are known.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match (self.start_date, self.duration_days) {
            (Some(start), Some(days)) if days > 0 => {
                start.checked_add_days(chrono::Days::new(days as u64))
            }
            _ => None,
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
        belongs_to = "super::campaign_group::Entity",
        from = "Column::CampaignGroupId",
        to = "super::campaign_group::Column::Id"
    )]
    CampaignGroup,
    #[sea_orm(has_many = "super::allocation::Entity")]
    Allocations,
    #[sea_orm(has_many = "super::playlist_placement::Entity")]
    PlaylistPlacements,
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::campaign_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CampaignGroup.def()
    }
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

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
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
