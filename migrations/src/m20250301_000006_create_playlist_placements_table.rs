use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlaylistPlacements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlaylistPlacements::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistPlacements::CampaignId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistPlacements::VendorId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistPlacements::PlaylistName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlaylistPlacements::PlaylistUrl).text().null())
                    .col(ColumnDef::new(PlaylistPlacements::Position).integer().null())
                    .col(
                        ColumnDef::new(PlaylistPlacements::StreamsDelivered)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PlaylistPlacements::PaymentStatus)
                            .string_len(32)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(PlaylistPlacements::PlacedAt).date().null())
                    .col(
                        ColumnDef::new(PlaylistPlacements::LastDeliveryAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistPlacements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PlaylistPlacements::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_placements_campaign_id")
                            .from(PlaylistPlacements::Table, PlaylistPlacements::CampaignId)
                            .to(
                                super::m20250301_000004_create_campaigns_table::Campaigns::Table,
                                super::m20250301_000004_create_campaigns_table::Campaigns::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_playlist_placements_vendor_id")
                            .from(PlaylistPlacements::Table, PlaylistPlacements::VendorId)
                            .to(
                                super::m20250301_000002_create_vendors_table::Vendors::Table,
                                super::m20250301_000002_create_vendors_table::Vendors::Id,
                            )
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlaylistPlacements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PlaylistPlacements {
    Table,
    Id,
    CampaignId,
    VendorId,
    PlaylistName,
    PlaylistUrl,
    Position,
    StreamsDelivered,
    PaymentStatus,
    PlacedAt,
    LastDeliveryAt,
    CreatedAt,
    UpdatedAt,
}
