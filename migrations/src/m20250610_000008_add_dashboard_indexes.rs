use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Campaign listings filter by status, client, group, and platform.
        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_status")
                    .table(Campaigns::Table)
                    .col(Campaigns::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_client_id")
                    .table(Campaigns::Table)
                    .col(Campaigns::ClientId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_campaign_group_id")
                    .table(Campaigns::Table)
                    .col(Campaigns::CampaignGroupId)
                    .to_owned(),
            )
            .await?;

        // Platform health rolls active campaigns up per platform.
        manager
            .create_index(
                Index::create()
                    .name("idx_campaigns_platform_status")
                    .table(Campaigns::Table)
                    .col(Campaigns::Platform)
                    .col(Campaigns::Status)
                    .to_owned(),
            )
            .await?;

        // Delivery rollups join on campaign; vendor performance joins on vendor.
        manager
            .create_index(
                Index::create()
                    .name("idx_allocations_campaign_id")
                    .table(Allocations::Table)
                    .col(Allocations::CampaignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_allocations_vendor_id")
                    .table(Allocations::Table)
                    .col(Allocations::VendorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_placements_campaign_id")
                    .table(PlaylistPlacements::Table)
                    .col(PlaylistPlacements::CampaignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_playlist_placements_vendor_id")
                    .table(PlaylistPlacements::Table)
                    .col(PlaylistPlacements::VendorId)
                    .to_owned(),
            )
            .await?;

        // Overdue scans filter pending invoices by due date.
        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_status_due_date")
                    .table(Invoices::Table)
                    .col(Invoices::Status)
                    .col(Invoices::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_client_id")
                    .table(Invoices::Table)
                    .col(Invoices::ClientId)
                    .to_owned(),
            )
            .await?;

        // Paid-this-month rollup scans by payment timestamp.
        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_paid_at")
                    .table(Invoices::Table)
                    .col(Invoices::PaidAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes = [
            ("idx_campaigns_status", Campaigns::Table.into_iden()),
            ("idx_campaigns_client_id", Campaigns::Table.into_iden()),
            (
                "idx_campaigns_campaign_group_id",
                Campaigns::Table.into_iden(),
            ),
            ("idx_campaigns_platform_status", Campaigns::Table.into_iden()),
            ("idx_allocations_campaign_id", Allocations::Table.into_iden()),
            ("idx_allocations_vendor_id", Allocations::Table.into_iden()),
            (
                "idx_playlist_placements_campaign_id",
                PlaylistPlacements::Table.into_iden(),
            ),
            (
                "idx_playlist_placements_vendor_id",
                PlaylistPlacements::Table.into_iden(),
            ),
            ("idx_invoices_status_due_date", Invoices::Table.into_iden()),
            ("idx_invoices_client_id", Invoices::Table.into_iden()),
            ("idx_invoices_paid_at", Invoices::Table.into_iden()),
        ];

        for (name, table) in indexes {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    ClientId,
    CampaignGroupId,
    Platform,
    Status,
}

#[derive(DeriveIden)]
enum Allocations {
    Table,
    CampaignId,
    VendorId,
}

#[derive(DeriveIden)]
enum PlaylistPlacements {
    Table,
    CampaignId,
    VendorId,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    ClientId,
    DueDate,
    Status,
    PaidAt,
}
