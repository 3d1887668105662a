pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_clients_table;
mod m20250301_000002_create_vendors_table;
mod m20250301_000003_create_campaign_groups_table;
mod m20250301_000004_create_campaigns_table;
mod m20250301_000005_create_allocations_table;
mod m20250301_000006_create_playlist_placements_table;
mod m20250301_000007_create_invoices_table;
mod m20250610_000008_add_dashboard_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_clients_table::Migration),
            Box::new(m20250301_000002_create_vendors_table::Migration),
            Box::new(m20250301_000003_create_campaign_groups_table::Migration),
            Box::new(m20250301_000004_create_campaigns_table::Migration),
            Box::new(m20250301_000005_create_allocations_table::Migration),
            Box::new(m20250301_000006_create_playlist_placements_table::Migration),
            Box::new(m20250301_000007_create_invoices_table::Migration),
            Box::new(m20250610_000008_add_dashboard_indexes::Migration),
        ]
    }
}
