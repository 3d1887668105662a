use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, Iterable, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    cache::SnapshotCache,
    db::DbPool,
    entities::{
        campaign::{self, Entity as CampaignEntity},
        invoice::{self, Entity as InvoiceEntity},
    },
    errors::ServiceError,
    metrics::APP_METRICS,
    models::{CampaignStatus, InvoiceStatus, PaceStatus, Platform},
    services::alerts::{Alert, AlertService, AlertSummary, DeliveryTotals},
    services::pacing::{evaluate_pacing, PacingInput, PacingReport},
};

const OPS_STATUS_KEY: &str = "ops_status";
const ALERTS_KEY: &str = "alerts";
const PLATFORM_HEALTH_KEY: &str = "platform_health";
const DATA_GAPS_KEY: &str = "data_gaps";

fn pacing_key(campaign_id: Uuid) -> String {
    format!("pacing:{}", campaign_id)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CampaignStatusCounts {
    pub draft: u64,
    pub active: u64,
    pub paused: u64,
    pub complete: u64,
    pub cancelled: u64,
    pub total: u64,
}

/// How the active roster is pacing, with unmeasured campaigns split out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PacingOverview {
    pub measured: u64,
    pub on_track: u64,
    pub behind: u64,
    pub critical: u64,
    pub unmeasured: u64,
    pub goal_units: i64,
    pub delivered_units: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InvoiceOverview {
    pub pending: u64,
    pub overdue: u64,
    pub overdue_amount: Decimal,
    pub paid_this_month: u64,
}

/// The ops-status landing payload: one glance at the whole operation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpsStatusResponse {
    pub generated_at: DateTime<Utc>,
    pub campaigns: CampaignStatusCounts,
    pub pacing: PacingOverview,
    pub alerts: AlertSummary,
    pub invoices: InvoiceOverview,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlatformHealthEntry {
    pub platform: Platform,
    pub unit_label: String,
    pub active_campaigns: u64,
    pub goal_units: i64,
    pub delivered_units: i64,
    pub on_track: u64,
    pub behind: u64,
    pub critical: u64,
    pub unmeasured: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlatformHealthResponse {
    pub generated_at: DateTime<Utc>,
    pub platforms: Vec<PlatformHealthEntry>,
}

/// A campaign that cannot be pace-measured and why.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataGapEntry {
    pub campaign_id: Uuid,
    pub name: String,
    pub artist_name: String,
    pub platform: Platform,
    pub status: CampaignStatus,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DataGapsResponse {
    pub generated_at: DateTime<Utc>,
    pub total: u64,
    pub campaigns: Vec<DataGapEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CampaignPacingResponse {
    pub campaign_id: Uuid,
    pub name: String,
    pub artist_name: String,
    pub platform: Platform,
    pub unit_label: String,
    // The flattened report already claims "status" for the pace verdict
    pub campaign_status: CampaignStatus,
    pub goal: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<i32>,
    pub end_date: Option<NaiveDate>,
    pub allocation_units: i64,
    pub placement_units: i64,
    #[serde(flatten)]
    pub report: PacingReport,
}

/// Assembles dashboard snapshots. Reads go through the TTL cache; the event
/// loop clears it whenever any write lands.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    alert_service: AlertService,
    cache: SnapshotCache,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, alert_service: AlertService, cache: SnapshotCache) -> Self {
        Self {
            db_pool,
            alert_service,
            cache,
        }
    }

    #[instrument(skip(self))]
    pub async fn ops_status(&self) -> Result<OpsStatusResponse, ServiceError> {
        if let Some(snapshot) = self.cached(OPS_STATUS_KEY) {
            return Ok(snapshot);
        }

        let today = Utc::now().date_naive();
        let (campaigns, pacing, alert_feed, invoices) = tokio::try_join!(
            self.campaign_status_counts(),
            self.pacing_overview(today),
            self.alert_service.collect_alerts(),
            self.invoice_overview(today),
        )?;

        let response = OpsStatusResponse {
            generated_at: Utc::now(),
            campaigns,
            pacing,
            alerts: AlertSummary::from_alerts(&alert_feed),
            invoices,
        };

        self.store(OPS_STATUS_KEY, &response);
        info!("Ops status snapshot assembled");
        Ok(response)
    }

    /// Full alert feed, severity then recency.
    #[instrument(skip(self))]
    pub async fn alerts(&self) -> Result<Vec<Alert>, ServiceError> {
        if let Some(snapshot) = self.cached(ALERTS_KEY) {
            return Ok(snapshot);
        }

        let alerts = self.alert_service.collect_alerts().await?;
        self.store(ALERTS_KEY, &alerts);
        Ok(alerts)
    }

    /// Per-platform rollup across the active roster. Every platform appears,
    /// zeroed when it has no campaigns, so dashboard rows stay stable.
    #[instrument(skip(self))]
    pub async fn platform_health(&self) -> Result<PlatformHealthResponse, ServiceError> {
        if let Some(snapshot) = self.cached(PLATFORM_HEALTH_KEY) {
            return Ok(snapshot);
        }

        let today = Utc::now().date_naive();
        let active = self.alert_service.active_campaigns().await?;
        let totals = self
            .alert_service
            .delivery_totals(active.iter().map(|c| c.id).collect())
            .await?;

        let mut platforms: Vec<PlatformHealthEntry> = Platform::iter()
            .map(|platform| PlatformHealthEntry {
                platform,
                unit_label: platform.unit_label().to_string(),
                active_campaigns: 0,
                goal_units: 0,
                delivered_units: 0,
                on_track: 0,
                behind: 0,
                critical: 0,
                unmeasured: 0,
            })
            .collect();

        for campaign in &active {
            let entry = platforms
                .iter_mut()
                .find(|e| e.platform == campaign.platform)
                .expect("every platform variant is present");

            let campaign_totals = totals.get(&campaign.id).copied().unwrap_or_default();
            let report = evaluate_pacing(
                &PacingInput {
                    goal: campaign.goal,
                    start_date: campaign.start_date,
                    duration_days: campaign.duration_days,
                    allocation_units: campaign_totals.allocation_units,
                    placement_units: campaign_totals.placement_units,
                },
                self.alert_service.policy().thresholds,
                today,
            );

            entry.active_campaigns += 1;
            entry.goal_units += campaign.goal.unwrap_or(0);
            entry.delivered_units += report.actual_units;
            if report.basis.is_measured() {
                match report.status {
                    PaceStatus::OnTrack => entry.on_track += 1,
                    PaceStatus::Behind => entry.behind += 1,
                    PaceStatus::Critical => entry.critical += 1,
                }
            } else {
                entry.unmeasured += 1;
            }
        }

        let response = PlatformHealthResponse {
            generated_at: Utc::now(),
            platforms,
        };

        self.store(PLATFORM_HEALTH_KEY, &response);
        Ok(response)
    }

    /// Non-terminal campaigns missing the fields pacing needs.
    #[instrument(skip(self))]
    pub async fn data_gaps(&self) -> Result<DataGapsResponse, ServiceError> {
        if let Some(snapshot) = self.cached(DATA_GAPS_KEY) {
            return Ok(snapshot);
        }

        let db = &*self.db_pool;
        let open_campaigns = CampaignEntity::find()
            .filter(campaign::Column::Status.is_in([
                CampaignStatus::Draft,
                CampaignStatus::Active,
                CampaignStatus::Paused,
            ]))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut entries = Vec::new();
        for campaign in open_campaigns {
            let mut missing = Vec::new();
            if campaign.goal.is_none() {
                missing.push("goal".to_string());
            }
            if campaign.start_date.is_none() {
                missing.push("start_date".to_string());
            }
            if campaign.duration_days.is_none() {
                missing.push("duration_days".to_string());
            }

            if !missing.is_empty() {
                entries.push(DataGapEntry {
                    campaign_id: campaign.id,
                    name: campaign.name,
                    artist_name: campaign.artist_name,
                    platform: campaign.platform,
                    status: campaign.status,
                    missing,
                });
            }
        }

        let response = DataGapsResponse {
            generated_at: Utc::now(),
            total: entries.len() as u64,
            campaigns: entries,
        };

        self.store(DATA_GAPS_KEY, &response);
        Ok(response)
    }

    /// Pacing detail for one campaign, whatever its status.
    #[instrument(skip(self), fields(campaign_id = %campaign_id))]
    pub async fn campaign_pacing(
        &self,
        campaign_id: Uuid,
    ) -> Result<CampaignPacingResponse, ServiceError> {
        let key = pacing_key(campaign_id);
        if let Some(snapshot) = self.cached(&key) {
            return Ok(snapshot);
        }

        let db = &*self.db_pool;
        let campaign = CampaignEntity::find_by_id(campaign_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))?;

        let totals = self.alert_service.delivery_totals(vec![campaign_id]).await?;
        let campaign_totals = totals.get(&campaign_id).copied().unwrap_or_default();

        let response = self.pacing_response(campaign, campaign_totals, Utc::now().date_naive());

        self.store(&key, &response);
        Ok(response)
    }

    /// Pacing rollup for every campaign in a group, newest first.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn group_pacing(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<CampaignPacingResponse>, ServiceError> {
        let db = &*self.db_pool;
        let campaigns = CampaignEntity::find()
            .filter(campaign::Column::CampaignGroupId.eq(group_id))
            .order_by_desc(campaign::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let totals = self
            .alert_service
            .delivery_totals(campaigns.iter().map(|c| c.id).collect())
            .await?;
        let today = Utc::now().date_naive();

        Ok(campaigns
            .into_iter()
            .map(|campaign| {
                let campaign_totals = totals.get(&campaign.id).copied().unwrap_or_default();
                self.pacing_response(campaign, campaign_totals, today)
            })
            .collect())
    }

    fn pacing_response(
        &self,
        campaign: campaign::Model,
        campaign_totals: DeliveryTotals,
        today: NaiveDate,
    ) -> CampaignPacingResponse {
        let report = evaluate_pacing(
            &PacingInput {
                goal: campaign.goal,
                start_date: campaign.start_date,
                duration_days: campaign.duration_days,
                allocation_units: campaign_totals.allocation_units,
                placement_units: campaign_totals.placement_units,
            },
            self.alert_service.policy().thresholds,
            today,
        );
        let end_date = campaign.end_date();

        CampaignPacingResponse {
            campaign_id: campaign.id,
            name: campaign.name,
            artist_name: campaign.artist_name,
            platform: campaign.platform,
            unit_label: campaign.platform.unit_label().to_string(),
            campaign_status: campaign.status,
            goal: campaign.goal,
            start_date: campaign.start_date,
            duration_days: campaign.duration_days,
            end_date,
            allocation_units: campaign_totals.allocation_units,
            placement_units: campaign_totals.placement_units,
            report,
        }
    }

    async fn campaign_status_counts(&self) -> Result<CampaignStatusCounts, ServiceError> {
        let db = &*self.db_pool;
        let mut counts = CampaignStatusCounts::default();

        for status in CampaignStatus::iter() {
            let count = CampaignEntity::find()
                .filter(campaign::Column::Status.eq(status))
                .count(db)
                .await
                .map_err(ServiceError::DatabaseError)?;

            match status {
                CampaignStatus::Draft => counts.draft = count,
                CampaignStatus::Active => counts.active = count,
                CampaignStatus::Paused => counts.paused = count,
                CampaignStatus::Complete => counts.complete = count,
                CampaignStatus::Cancelled => counts.cancelled = count,
            }
            counts.total += count;
        }

        Ok(counts)
    }

    async fn pacing_overview(&self, today: NaiveDate) -> Result<PacingOverview, ServiceError> {
        let active = self.alert_service.active_campaigns().await?;
        let totals = self
            .alert_service
            .delivery_totals(active.iter().map(|c| c.id).collect())
            .await?;

        let mut overview = PacingOverview::default();
        for campaign in &active {
            let campaign_totals = totals.get(&campaign.id).copied().unwrap_or_default();
            let report = evaluate_pacing(
                &PacingInput {
                    goal: campaign.goal,
                    start_date: campaign.start_date,
                    duration_days: campaign.duration_days,
                    allocation_units: campaign_totals.allocation_units,
                    placement_units: campaign_totals.placement_units,
                },
                self.alert_service.policy().thresholds,
                today,
            );

            overview.goal_units += campaign.goal.unwrap_or(0);
            overview.delivered_units += report.actual_units;
            if report.basis.is_measured() {
                overview.measured += 1;
                match report.status {
                    PaceStatus::OnTrack => overview.on_track += 1,
                    PaceStatus::Behind => overview.behind += 1,
                    PaceStatus::Critical => overview.critical += 1,
                }
            } else {
                overview.unmeasured += 1;
            }
        }

        Ok(overview)
    }

    async fn invoice_overview(&self, today: NaiveDate) -> Result<InvoiceOverview, ServiceError> {
        let db = &*self.db_pool;

        let pending = InvoiceEntity::find()
            .filter(invoice::Column::Status.eq(InvoiceStatus::Pending))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let overdue_invoices = InvoiceEntity::find()
            .filter(invoice::Column::Status.eq(InvoiceStatus::Pending))
            .filter(invoice::Column::DueDate.lt(today))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let overdue_amount: Decimal = overdue_invoices.iter().map(|i| i.amount).sum();

        let month_start = today
            .with_day(1)
            .unwrap_or(today)
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();
        let paid_this_month = InvoiceEntity::find()
            .filter(invoice::Column::Status.eq(InvoiceStatus::Paid))
            .filter(invoice::Column::PaidAt.gte(month_start))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(InvoiceOverview {
            pending,
            overdue: overdue_invoices.len() as u64,
            overdue_amount,
            paid_this_month,
        })
    }

    fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key) {
            Ok(Some(snapshot)) => {
                APP_METRICS.record_cache_hit();
                Some(snapshot)
            }
            Ok(None) => {
                APP_METRICS.record_cache_miss();
                None
            }
            Err(e) => {
                warn!(error = %e, key, "Snapshot cache read failed");
                APP_METRICS.record_cache_miss();
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.cache.set(key, value) {
            warn!(error = %e, key, "Snapshot cache write failed");
        }
    }
}
