//! SeaORM entities for the campaign-operations schema.

pub mod allocation;
pub mod campaign;
pub mod campaign_group;
pub mod client;
pub mod invoice;
pub mod playlist_placement;
pub mod vendor;
