use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{cache::SnapshotCache, webhooks::WebhookNotifier};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Failures are reported, never fatal.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Everything the system announces. Serialized form doubles as the webhook
/// payload body, so variants keep stable snake_case names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Event {
    // Client events
    ClientCreated(Uuid),
    ClientUpdated(Uuid),
    ClientDeactivated(Uuid),

    // Campaign group events
    CampaignGroupCreated(Uuid),
    CampaignGroupUpdated(Uuid),
    CampaignGroupDeleted(Uuid),

    // Campaign events
    CampaignCreated(Uuid),
    CampaignUpdated(Uuid),
    CampaignStatusChanged {
        campaign_id: Uuid,
        old_status: String,
        new_status: String,
    },
    CampaignCancelled(Uuid),
    CampaignCompleted(Uuid),
    CampaignPaceCritical {
        campaign_id: Uuid,
        pace: f64,
        expected_units: f64,
        actual_units: i64,
    },

    // Delivery events
    AllocationCreated {
        campaign_id: Uuid,
        allocation_id: Uuid,
    },
    PlacementCreated {
        campaign_id: Uuid,
        placement_id: Uuid,
    },
    AllocationDeleted {
        campaign_id: Uuid,
        allocation_id: Uuid,
    },
    PlacementDeleted {
        campaign_id: Uuid,
        placement_id: Uuid,
    },
    DeliveryRecorded {
        campaign_id: Uuid,
        source_id: Uuid,
        source_type: String,
        units_added: i64,
        total_delivered: i64,
    },

    // Vendor events
    VendorCreated(Uuid),
    VendorUpdated(Uuid),
    VendorDeactivated(Uuid),

    // Invoice events
    InvoiceCreated(Uuid),
    InvoiceStatusChanged {
        invoice_id: Uuid,
        old_status: String,
        new_status: String,
    },
    InvoicePaid {
        invoice_id: Uuid,
        client_id: Uuid,
        amount: Decimal,
    },
    InvoiceVoided(Uuid),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ClientCreated(_) => "client_created",
            Event::ClientUpdated(_) => "client_updated",
            Event::ClientDeactivated(_) => "client_deactivated",
            Event::CampaignGroupCreated(_) => "campaign_group_created",
            Event::CampaignGroupUpdated(_) => "campaign_group_updated",
            Event::CampaignGroupDeleted(_) => "campaign_group_deleted",
            Event::CampaignCreated(_) => "campaign_created",
            Event::CampaignUpdated(_) => "campaign_updated",
            Event::CampaignStatusChanged { .. } => "campaign_status_changed",
            Event::CampaignCancelled(_) => "campaign_cancelled",
            Event::CampaignCompleted(_) => "campaign_completed",
            Event::CampaignPaceCritical { .. } => "campaign_pace_critical",
            Event::AllocationCreated { .. } => "allocation_created",
            Event::PlacementCreated { .. } => "placement_created",
            Event::AllocationDeleted { .. } => "allocation_deleted",
            Event::PlacementDeleted { .. } => "placement_deleted",
            Event::DeliveryRecorded { .. } => "delivery_recorded",
            Event::VendorCreated(_) => "vendor_created",
            Event::VendorUpdated(_) => "vendor_updated",
            Event::VendorDeactivated(_) => "vendor_deactivated",
            Event::InvoiceCreated(_) => "invoice_created",
            Event::InvoiceStatusChanged { .. } => "invoice_status_changed",
            Event::InvoicePaid { .. } => "invoice_paid",
            Event::InvoiceVoided(_) => "invoice_voided",
        }
    }

    /// Events forwarded to the configured webhook endpoint. Everything else
    /// stays internal.
    pub fn is_outbound(&self) -> bool {
        matches!(
            self,
            Event::CampaignPaceCritical { .. }
                | Event::CampaignCompleted(_)
                | Event::InvoicePaid { .. }
        )
    }
}

/// Drains the event channel: logs every event, drops stale dashboard
/// snapshots, and forwards the outbound subset to the webhook notifier when
/// one is configured.
pub async fn process_events(
    mut rx: mpsc::Receiver<Event>,
    notifier: Option<Arc<WebhookNotifier>>,
    cache: SnapshotCache,
) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::CampaignPaceCritical {
                campaign_id, pace, ..
            } => {
                warn!(
                    %campaign_id,
                    pace = format!("{:.2}", pace),
                    "Campaign pace dropped below the critical threshold"
                );
            }
            Event::DeliveryRecorded {
                campaign_id,
                units_added,
                total_delivered,
                ..
            } => {
                info!(
                    %campaign_id,
                    units_added,
                    total_delivered,
                    "Delivery recorded"
                );
            }
            Event::CampaignCompleted(campaign_id) => {
                info!(%campaign_id, "Campaign completed");
            }
            Event::InvoicePaid {
                invoice_id, amount, ..
            } => {
                info!(%invoice_id, %amount, "Invoice paid");
            }
            other => {
                info!(event = other.name(), "Received event");
            }
        }

        // Every event marks a write somewhere; cached snapshots are stale.
        cache.invalidate_all();

        if event.is_outbound() {
            if let Some(notifier) = &notifier {
                notifier.send_async(&event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn serializes_with_snake_case_event_tag() {
        let event = Event::CampaignPaceCritical {
            campaign_id: Uuid::new_v4(),
            pace: 0.42,
            expected_units: 50_000.0,
            actual_units: 21_000,
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "campaign_pace_critical");
        assert_eq!(value["data"]["actual_units"], 21_000);
    }

    #[test]
    fn name_matches_serialized_tag() {
        let event = Event::InvoicePaid {
            invoice_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            amount: dec!(1500.00),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], event.name());
    }

    #[test]
    fn only_noteworthy_events_are_outbound() {
        let id = Uuid::new_v4();
        assert!(Event::CampaignCompleted(id).is_outbound());
        assert!(Event::CampaignPaceCritical {
            campaign_id: id,
            pace: 0.3,
            expected_units: 1000.0,
            actual_units: 300,
        }
        .is_outbound());

        assert!(!Event::CampaignCreated(id).is_outbound());
        assert!(!Event::VendorDeactivated(id).is_outbound());
    }

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender.send(Event::CampaignCreated(Uuid::new_v4())).await.unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.name(), "campaign_created");
    }

    #[tokio::test]
    async fn processing_an_event_clears_cached_snapshots() {
        let (tx, rx) = mpsc::channel(8);
        let cache = SnapshotCache::new(Some(std::time::Duration::from_secs(60)));
        cache.set("ops_status", &"snapshot".to_string()).unwrap();

        let loop_handle = tokio::spawn(process_events(rx, None, cache.clone()));

        let sender = EventSender::new(tx);
        sender.send(Event::ClientCreated(Uuid::new_v4())).await.unwrap();
        drop(sender);
        loop_handle.await.unwrap();

        assert_eq!(cache.get::<String>("ops_status").unwrap(), None);
    }
}
