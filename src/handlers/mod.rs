pub mod campaign_groups;
pub mod campaigns;
pub mod clients;
pub mod dashboard;
pub mod delivery;
pub mod invoices;
pub mod vendors;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
