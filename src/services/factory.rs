use std::sync::Arc;

use crate::{
    cache::SnapshotCache,
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        alerts::{AlertPolicy, AlertService},
        campaign_groups::CampaignGroupService,
        campaigns::CampaignService,
        clients::ClientService,
        dashboard::DashboardService,
        delivery::DeliveryService,
        invoices::InvoiceService,
        vendors::VendorService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    policy: AlertPolicy,
    cache: SnapshotCache,
    default_currency: String,
}

impl ServiceFactory {
    /// Creates a new service factory with the given dependencies
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        Self {
            db_pool,
            event_sender,
            policy: AlertPolicy::from(config),
            cache: SnapshotCache::new(config.dashboard_cache_ttl()),
            default_currency: config.default_currency.clone(),
        }
    }

    /// Creates a client service instance
    pub fn client_service(&self) -> ClientService {
        ClientService::new(self.db_pool.clone(), self.events())
    }

    /// Creates a campaign group service instance
    pub fn campaign_group_service(&self) -> CampaignGroupService {
        CampaignGroupService::new(self.db_pool.clone(), self.events())
    }

    /// Creates a campaign service instance
    pub fn campaign_service(&self) -> CampaignService {
        CampaignService::new(self.db_pool.clone(), self.events())
    }

    /// Creates a delivery service instance
    pub fn delivery_service(&self) -> DeliveryService {
        DeliveryService::new(self.db_pool.clone(), self.events(), self.policy.thresholds)
    }

    /// Creates a vendor service instance
    pub fn vendor_service(&self) -> VendorService {
        VendorService::new(self.db_pool.clone(), self.events())
    }

    /// Creates an invoice service instance
    pub fn invoice_service(&self) -> InvoiceService {
        InvoiceService::new(
            self.db_pool.clone(),
            self.events(),
            self.default_currency.clone(),
        )
    }

    /// Creates an alert service instance
    pub fn alert_service(&self) -> AlertService {
        AlertService::new(self.db_pool.clone(), self.policy.clone())
    }

    /// Creates a dashboard service instance sharing the snapshot cache
    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(self.db_pool.clone(), self.alert_service(), self.cache.clone())
    }

    /// Gets a handle on the shared snapshot cache
    pub fn cache(&self) -> SnapshotCache {
        self.cache.clone()
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }

    /// Gets a reference to the event sender
    pub fn event_sender(&self) -> &EventSender {
        &self.event_sender
    }

    fn events(&self) -> Option<Arc<EventSender>> {
        Some(Arc::new(self.event_sender.clone()))
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub clients: Arc<ClientService>,
    pub campaign_groups: Arc<CampaignGroupService>,
    pub campaigns: Arc<CampaignService>,
    pub delivery: Arc<DeliveryService>,
    pub vendors: Arc<VendorService>,
    pub invoices: Arc<InvoiceService>,
    pub alerts: Arc<AlertService>,
    pub dashboard: Arc<DashboardService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            clients: Arc::new(factory.client_service()),
            campaign_groups: Arc::new(factory.campaign_group_service()),
            campaigns: Arc::new(factory.campaign_service()),
            delivery: Arc::new(factory.delivery_service()),
            vendors: Arc::new(factory.vendor_service()),
            invoices: Arc::new(factory.invoice_service()),
            alerts: Arc::new(factory.alert_service()),
            dashboard: Arc::new(factory.dashboard_service()),
        }
    }
}
