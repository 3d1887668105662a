//! Shared domain enums for campaigns, delivery, invoicing, and alerting.
//!
//! Database-backed enums (`Platform`, `CampaignStatus`, `PaymentStatus`,
//! `InvoiceStatus`) are stored as lowercase strings; derived enums
//! (`PaceStatus`, `PacingBasis`, `AlertSeverity`, `AlertKind`) only ever
//! appear in computed payloads.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Platform a promotion campaign runs on.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    #[sea_orm(string_value = "spotify")]
    Spotify,
    #[sea_orm(string_value = "youtube")]
    Youtube,
    #[sea_orm(string_value = "instagram")]
    Instagram,
    #[sea_orm(string_value = "soundcloud")]
    Soundcloud,
}

impl Platform {
    /// Unit the platform's goal metric counts.
    pub fn unit_label(&self) -> &'static str {
        match self {
            Platform::Spotify | Platform::Soundcloud => "streams",
            Platform::Youtube | Platform::Instagram => "views",
        }
    }
}

/// Lifecycle status of a campaign.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CampaignStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "paused")]
    Paused,
    #[sea_orm(string_value = "complete")]
    Complete,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl CampaignStatus {
    /// Whether a transition to `next` is allowed. Terminal states
    /// (`complete`, `cancelled`) accept no further transitions.
    pub fn can_transition_to(&self, next: CampaignStatus) -> bool {
        use CampaignStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Draft, Cancelled)
                | (Active, Paused)
                | (Active, Complete)
                | (Active, Cancelled)
                | (Paused, Active)
                | (Paused, Complete)
                | (Paused, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Complete | CampaignStatus::Cancelled)
    }
}

/// Payment state of an allocation or playlist placement.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "invoiced")]
    Invoiced,
    #[sea_orm(string_value = "paid")]
    Paid,
}

/// Lifecycle status of a client invoice. Overdue is derived from
/// `due_date`, never stored.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "void")]
    Void,
}

impl InvoiceStatus {
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!((self, next), (Pending, Paid) | (Pending, Void))
    }
}

/// Classification of a measured pace against the configured thresholds.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaceStatus {
    OnTrack,
    Behind,
    Critical,
}

impl PaceStatus {
    /// Classifies a pace ratio. Boundaries are exclusive: a pace of
    /// exactly the warning threshold is on track.
    pub fn classify(pace: f64, warning_threshold: f64, critical_threshold: f64) -> Self {
        if pace < critical_threshold {
            PaceStatus::Critical
        } else if pace < warning_threshold {
            PaceStatus::Behind
        } else {
            PaceStatus::OnTrack
        }
    }
}

/// What a pacing report was computed from. Anything other than
/// `Measured` means the pace defaulted to neutral because an input was
/// missing, and the campaign shows up as a data gap instead of alerting.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PacingBasis {
    Measured,
    MissingGoal,
    MissingStartDate,
    MissingDuration,
    NotStarted,
}

impl PacingBasis {
    pub fn is_measured(&self) -> bool {
        matches!(self, PacingBasis::Measured)
    }

    /// Short label used in data-gap payloads naming the missing input.
    pub fn gap_label(&self) -> Option<&'static str> {
        match self {
            PacingBasis::Measured => None,
            PacingBasis::MissingGoal => Some("goal"),
            PacingBasis::MissingStartDate => Some("start_date"),
            PacingBasis::MissingDuration => Some("duration_days"),
            PacingBasis::NotStarted => Some("not_started"),
        }
    }
}

/// Alert severity. Declaration order drives feed ordering: critical
/// sorts before warning, warning before info.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// The condition an alert record was raised for.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertKind {
    CampaignBehindPace,
    CampaignPaceCritical,
    InvoiceOverdue,
    DeliveryStalled,
}
