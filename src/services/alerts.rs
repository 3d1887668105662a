use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    db::DbPool,
    entities::{
        allocation::{self, Entity as AllocationEntity},
        campaign::{self, Entity as CampaignEntity},
        invoice::{self, Entity as InvoiceEntity},
        playlist_placement::{self, Entity as PlacementEntity},
    },
    errors::ServiceError,
    metrics::OPS_METRICS,
    models::{AlertKind, AlertSeverity, CampaignStatus, PaceStatus},
    services::pacing::{evaluate_pacing, PaceThresholds, PacingInput, PacingReport},
};

/// Tunables that decide when something becomes an alert.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    pub thresholds: PaceThresholds,
    pub invoice_critical_overdue_days: i64,
    pub stalled_delivery_days: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            thresholds: PaceThresholds::default(),
            invoice_critical_overdue_days: 30,
            stalled_delivery_days: 7,
        }
    }
}

impl From<&AppConfig> for AlertPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            thresholds: PaceThresholds {
                warning: config.pace_warning_threshold,
                critical: config.pace_critical_threshold,
            },
            invoice_critical_overdue_days: config.invoice_critical_overdue_days,
            stalled_delivery_days: config.stalled_delivery_days,
        }
    }
}

/// A single feed entry. `triggered_at` is when the underlying condition
/// arose, not when the feed was assembled, so ordering is stable across
/// refreshes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    pub triggered_at: DateTime<Utc>,
}

/// Severity counts for the ops-status header row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AlertSummary {
    pub critical: u64,
    pub warning: u64,
    pub info: u64,
    pub total: u64,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut summary = Self::default();
        for alert in alerts {
            match alert.severity {
                AlertSeverity::Critical => summary.critical += 1,
                AlertSeverity::Warning => summary.warning += 1,
                AlertSeverity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

/// Critical first, then most recent first within a severity.
pub fn sort_alerts(alerts: &mut [Alert]) {
    alerts.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(b.triggered_at.cmp(&a.triggered_at))
    });
}

/// Alert for a measured campaign pacing under its thresholds. On-track and
/// unmeasured campaigns produce nothing.
pub fn pacing_alert(campaign: &campaign::Model, report: &PacingReport) -> Option<Alert> {
    let (kind, severity) = match report.status {
        PaceStatus::OnTrack => return None,
        PaceStatus::Behind => (AlertKind::CampaignBehindPace, AlertSeverity::Warning),
        PaceStatus::Critical => (AlertKind::CampaignPaceCritical, AlertSeverity::Critical),
    };

    Some(Alert {
        kind,
        severity,
        message: format!(
            "{} ({}) is pacing at {:.0}% of expected delivery",
            campaign.name,
            campaign.artist_name,
            report.pace * 100.0
        ),
        campaign_id: Some(campaign.id),
        invoice_id: None,
        client_id: Some(campaign.client_id),
        triggered_at: campaign.updated_at,
    })
}

/// Alert for a pending invoice past its due date. Escalates to critical once
/// the overdue period exceeds the configured grace window.
pub fn invoice_alert(invoice: &invoice::Model, today: NaiveDate, policy: &AlertPolicy) -> Option<Alert> {
    if !invoice.is_overdue(today) {
        return None;
    }

    let days_overdue = invoice.days_overdue(today);
    let severity = if days_overdue > policy.invoice_critical_overdue_days {
        AlertSeverity::Critical
    } else {
        AlertSeverity::Warning
    };

    Some(Alert {
        kind: AlertKind::InvoiceOverdue,
        severity,
        message: format!(
            "Invoice {} is {} days overdue ({} {})",
            invoice.invoice_number, days_overdue, invoice.amount, invoice.currency
        ),
        campaign_id: invoice.campaign_id,
        invoice_id: Some(invoice.id),
        client_id: Some(invoice.client_id),
        triggered_at: invoice.due_date.and_hms_opt(0, 0, 0).unwrap().and_utc(),
    })
}

/// Alert for an active campaign with no recorded delivery inside the stall
/// window. Campaigns that never delivered fall back to their start date;
/// with neither a delivery nor a start date there is no reference point and
/// the campaign is left to the data-gaps report.
pub fn stalled_delivery_alert(
    campaign: &campaign::Model,
    last_delivery: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    policy: &AlertPolicy,
) -> Option<Alert> {
    let reference = last_delivery.or_else(|| {
        campaign
            .start_date
            .map(|d| d.and_hms_opt(0, 0, 0).unwrap().and_utc())
    })?;

    if reference > now {
        return None;
    }

    let idle = now - reference;
    if idle <= Duration::days(policy.stalled_delivery_days) {
        return None;
    }

    Some(Alert {
        kind: AlertKind::DeliveryStalled,
        severity: AlertSeverity::Warning,
        message: format!(
            "{} ({}) has had no delivery for {} days",
            campaign.name,
            campaign.artist_name,
            idle.num_days()
        ),
        campaign_id: Some(campaign.id),
        invoice_id: None,
        client_id: Some(campaign.client_id),
        triggered_at: reference,
    })
}

/// Per-campaign delivery rollup used by pacing and stall checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeliveryTotals {
    pub allocation_units: i64,
    pub placement_units: i64,
    pub last_delivery_at: Option<DateTime<Utc>>,
}

impl DeliveryTotals {
    fn merge_delivery_time(&mut self, at: Option<DateTime<Utc>>) {
        if let Some(at) = at {
            self.last_delivery_at = Some(match self.last_delivery_at {
                Some(existing) => existing.max(at),
                None => at,
            });
        }
    }
}

/// Aggregates the alert feed across campaigns and invoices.
#[derive(Clone)]
pub struct AlertService {
    db_pool: Arc<DbPool>,
    policy: AlertPolicy,
}

impl AlertService {
    pub fn new(db_pool: Arc<DbPool>, policy: AlertPolicy) -> Self {
        Self { db_pool, policy }
    }

    pub fn policy(&self) -> &AlertPolicy {
        &self.policy
    }

    /// Assemble the full feed, sorted by severity then recency.
    #[instrument(skip(self))]
    pub async fn collect_alerts(&self) -> Result<Vec<Alert>, ServiceError> {
        let now = Utc::now();
        let today = now.date_naive();

        let mut alerts = Vec::new();

        let active_campaigns = self.active_campaigns().await?;
        let totals = self
            .delivery_totals(active_campaigns.iter().map(|c| c.id).collect())
            .await?;

        for campaign in &active_campaigns {
            let campaign_totals = totals.get(&campaign.id).copied().unwrap_or_default();

            let report = evaluate_pacing(
                &PacingInput {
                    goal: campaign.goal,
                    start_date: campaign.start_date,
                    duration_days: campaign.duration_days,
                    allocation_units: campaign_totals.allocation_units,
                    placement_units: campaign_totals.placement_units,
                },
                self.policy.thresholds,
                today,
            );
            OPS_METRICS.record_pace_evaluation();

            if let Some(alert) = pacing_alert(campaign, &report) {
                alerts.push(alert);
            }
            if let Some(alert) =
                stalled_delivery_alert(campaign, campaign_totals.last_delivery_at, now, &self.policy)
            {
                alerts.push(alert);
            }
        }

        for overdue in self.overdue_invoices(today).await? {
            if let Some(alert) = invoice_alert(&overdue, today, &self.policy) {
                alerts.push(alert);
            }
        }

        sort_alerts(&mut alerts);

        let critical_count = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count() as u64;
        OPS_METRICS.record_alert_evaluation(critical_count);

        info!(
            total = alerts.len(),
            critical = critical_count,
            "Alert feed assembled"
        );

        Ok(alerts)
    }

    pub async fn active_campaigns(&self) -> Result<Vec<campaign::Model>, ServiceError> {
        let db = &*self.db_pool;
        CampaignEntity::find()
            .filter(campaign::Column::Status.eq(CampaignStatus::Active))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Roll up delivered units and the latest delivery time per campaign.
    pub async fn delivery_totals(
        &self,
        campaign_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, DeliveryTotals>, ServiceError> {
        let db = &*self.db_pool;
        let mut totals: HashMap<Uuid, DeliveryTotals> = HashMap::new();

        if campaign_ids.is_empty() {
            return Ok(totals);
        }

        let allocations = AllocationEntity::find()
            .filter(allocation::Column::CampaignId.is_in(campaign_ids.clone()))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        for row in allocations {
            let entry = totals.entry(row.campaign_id).or_default();
            entry.allocation_units += row.delivered_units;
            entry.merge_delivery_time(row.last_delivery_at);
        }

        let placements = PlacementEntity::find()
            .filter(playlist_placement::Column::CampaignId.is_in(campaign_ids))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        for row in placements {
            let entry = totals.entry(row.campaign_id).or_default();
            entry.placement_units += row.streams_delivered;
            entry.merge_delivery_time(row.last_delivery_at);
        }

        Ok(totals)
    }

    async fn overdue_invoices(&self, today: NaiveDate) -> Result<Vec<invoice::Model>, ServiceError> {
        let db = &*self.db_pool;
        InvoiceEntity::find()
            .filter(invoice::Column::Status.eq(crate::models::InvoiceStatus::Pending))
            .filter(invoice::Column::DueDate.lt(today))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
