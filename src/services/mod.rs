// Pacing math and alert assembly
pub mod alerts;
pub mod pacing;

// Campaign operations
pub mod campaign_groups;
pub mod campaigns;
pub mod delivery;

// Roster management
pub mod clients;
pub mod vendors;

// Billing
pub mod invoices;

// Dashboard snapshots
pub mod dashboard;

// Service factory for dependency injection
pub mod factory;
